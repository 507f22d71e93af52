//! The `Widget` entity, its builder, and the partial-update patch.
//!
//! A widget is uniquely identified by the `(tenant_key, key)` pair within
//! the store. Values are immutable once constructed; modification is
//! expressed by building a new value seeded from the current one and
//! replacing the stored record.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The persisted domain entity: tenant key, record key, description.
///
/// Serializes with camelCase field names to match the wire JSON shape
/// (`tenantKey`, `key`, `description`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    tenant_key: String,
    key: String,
    description: String,
}

impl Widget {
    /// Construct a widget from its three attributes.
    pub fn new(
        tenant_key: impl Into<String>,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tenant_key: tenant_key.into(),
            key: key.into(),
            description: description.into(),
        }
    }

    /// Partition/tenant identifier, part of the composite identity.
    pub fn tenant_key(&self) -> &str {
        &self.tenant_key
    }

    /// Record identifier, unique within a tenant, part of the composite
    /// identity.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mutable payload attribute.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether `other` shares this widget's composite identity.
    pub fn same_identity(&self, other: &Widget) -> bool {
        self.tenant_key == other.tenant_key && self.key == other.key
    }

    /// Start a blank builder.
    pub fn builder() -> WidgetBuilder {
        WidgetBuilder::default()
    }

    /// Start a builder seeded from this value. Fields left untouched on
    /// the builder carry this value's current fields through to `build`.
    pub fn to_builder(&self) -> WidgetBuilder {
        WidgetBuilder {
            tenant_key: Some(self.tenant_key.clone()),
            key: Some(self.key.clone()),
            description: Some(self.description.clone()),
        }
    }
}

/// Builder for `Widget` values.
///
/// A builder seeded from an existing value never silently defaults an
/// unset field: unset fields copy through the seed. A blank builder fails
/// `build` if any field was never provided.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetBuilder {
    tenant_key: Option<String>,
    key: Option<String>,
    description: Option<String>,
}

impl WidgetBuilder {
    pub fn tenant_key(mut self, tenant_key: impl Into<String>) -> Self {
        self.tenant_key = Some(tenant_key.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Finish the builder, failing if any field is still unset.
    pub fn build(self) -> Result<Widget, ValidationError> {
        let required = |field, value: Option<String>| {
            value.ok_or(ValidationError::RequiredFieldMissing { field })
        };
        Ok(Widget {
            tenant_key: required("tenantKey", self.tenant_key)?,
            key: required("key", self.key)?,
            description: required("description", self.description)?,
        })
    }
}

/// Partial update for a widget: only the fields present are applied, the
/// rest carry over unchanged from the record being updated.
///
/// Deserializes from an update request body, so an omitted JSON field
/// means "leave this attribute alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WidgetPatch {
    /// A patch that changes only the description.
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.tenant_key.is_none() && self.key.is_none() && self.description.is_none()
    }

    /// Overlay the present fields onto `current`, producing the candidate
    /// record for a replace. Absent fields carry through unchanged.
    pub fn apply_to(&self, current: &Widget) -> Widget {
        Widget {
            tenant_key: self
                .tenant_key
                .clone()
                .unwrap_or_else(|| current.tenant_key.clone()),
            key: self.key.clone().unwrap_or_else(|| current.key.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
