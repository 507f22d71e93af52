//! Record Access Layer: the five widget operations.
//!
//! `WidgetDao` binds parameters into cached prepared statements, issues
//! execution through the future bridge, drains read results through the
//! row streamer, and maps rows to domain values. `update` selects between
//! two mutually exclusive write strategies depending on whether the
//! record's identity fields change.
//!
//! The DAO holds no cross-call mutable state beyond the statement cache
//! and the shared session; concurrent callers may interleave freely.

use std::sync::Arc;

use widget_core::{DriverError, StoreError, Widget, WidgetPatch, WidgetResult};

use crate::bridge::bridge;
use crate::driver::{BoundStatement, Row, StoreSession};
use crate::statements::StatementCache;
use crate::stream::{collect_rows, stream_until};

/// Table the widget rows live in.
pub const TABLE: &str = "widgets";

/// Column names of the persisted row shape.
pub mod fields {
    pub const TENANT_KEY: &str = "tenant_key";
    pub const KEY: &str = "key";
    pub const DESCRIPTION: &str = "description";
}

/// The write path chosen for an update, decided once per call from the
/// identity fields of the current and candidate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Identity unchanged: rewrite the non-identity attributes of the
    /// existing row in place.
    Rewrite,
    /// Identity changing: the old row is keyed on a superseded identity,
    /// so delete it and insert the new record in one atomic batch.
    Move,
}

impl WriteStrategy {
    /// The single source of truth for the update branch: identity-field
    /// equality between the retrieved record and the candidate.
    pub fn select(current: &Widget, candidate: &Widget) -> Self {
        if current.same_identity(candidate) {
            Self::Rewrite
        } else {
            Self::Move
        }
    }
}

/// Data access for the widget entity over a shared store session.
pub struct WidgetDao {
    session: Arc<dyn StoreSession>,
    statements: StatementCache,
}

impl WidgetDao {
    pub fn new(session: Arc<dyn StoreSession>) -> Self {
        Self {
            session,
            statements: StatementCache::new(),
        }
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    fn row_to_widget(row: &Row) -> WidgetResult<Widget> {
        let column = |name: &str| {
            row.get(name).map(str::to_owned).ok_or_else(|| {
                StoreError::Execution(DriverError::new(format!(
                    "result row is missing the \"{}\" column",
                    name
                )))
            })
        };
        Ok(Widget::new(
            column(fields::TENANT_KEY)?,
            column(fields::KEY)?,
            column(fields::DESCRIPTION)?,
        ))
    }

    // ========================================================================
    // STATEMENT BINDING
    // ========================================================================

    fn bind_list(
        &self,
        tenant_key: &str,
        limit: i32,
        offset_key: &str,
    ) -> Result<BoundStatement, DriverError> {
        let template = self.statements.get_or_prepare("list", || {
            self.session.prepare(&format!(
                "SELECT * FROM {TABLE} \
                 WHERE {tenant} = :tenant_key AND {key} > :offset_key \
                 LIMIT :result_limit",
                tenant = fields::TENANT_KEY,
                key = fields::KEY,
            ))
        })?;
        Ok(template
            .bind()
            .set_text("tenant_key", tenant_key)
            .set_text("offset_key", offset_key)
            .set_int("result_limit", limit))
    }

    fn bind_create(&self, widget: &Widget) -> Result<BoundStatement, DriverError> {
        let template = self.statements.get_or_prepare("create", || {
            self.session.prepare(&format!(
                "INSERT INTO {TABLE} ({tenant}, {key}, {description}) \
                 VALUES (:tenant_key, :key, :description)",
                tenant = fields::TENANT_KEY,
                key = fields::KEY,
                description = fields::DESCRIPTION,
            ))
        })?;
        Ok(template
            .bind()
            .set_text("tenant_key", widget.tenant_key())
            .set_text("key", widget.key())
            .set_text("description", widget.description()))
    }

    fn bind_retrieve(&self, tenant_key: &str, key: &str) -> Result<BoundStatement, DriverError> {
        let template = self.statements.get_or_prepare("retrieve", || {
            self.session.prepare(&format!(
                "SELECT * FROM {TABLE} \
                 WHERE {tenant} = :tenant_key AND {key} = :key",
                tenant = fields::TENANT_KEY,
                key = fields::KEY,
            ))
        })?;
        Ok(template
            .bind()
            .set_text("tenant_key", tenant_key)
            .set_text("key", key))
    }

    /// Targeted rewrite of the non-identity attributes: the identity
    /// fields appear only in the WHERE clause, never in SET.
    fn bind_update(
        &self,
        current: &Widget,
        candidate: &Widget,
    ) -> Result<BoundStatement, DriverError> {
        let template = self.statements.get_or_prepare("update", || {
            self.session.prepare(&format!(
                "UPDATE {TABLE} SET {description} = :description \
                 WHERE {tenant} = :tenant_key AND {key} = :key",
                description = fields::DESCRIPTION,
                tenant = fields::TENANT_KEY,
                key = fields::KEY,
            ))
        })?;
        Ok(template
            .bind()
            .set_text("tenant_key", current.tenant_key())
            .set_text("key", current.key())
            .set_text("description", candidate.description()))
    }

    fn bind_delete(&self, tenant_key: &str, key: &str) -> Result<BoundStatement, DriverError> {
        let template = self.statements.get_or_prepare("delete", || {
            self.session.prepare(&format!(
                "DELETE FROM {TABLE} \
                 WHERE {tenant} = :tenant_key AND {key} = :key",
                tenant = fields::TENANT_KEY,
                key = fields::KEY,
            ))
        })?;
        Ok(template
            .bind()
            .set_text("tenant_key", tenant_key)
            .set_text("key", key))
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// List widgets in `tenant_key` with `key > offset_key`, ascending by
    /// key, capped at `limit`. An empty `offset_key` starts from the
    /// beginning of key order.
    pub async fn list(
        &self,
        tenant_key: &str,
        limit: i32,
        offset_key: &str,
    ) -> WidgetResult<Vec<Widget>> {
        let statement = self.bind_list(tenant_key, limit, offset_key)?;
        let first_page = bridge(|callback| self.session.execute(&statement, callback));
        // The stop condition is purely page exhaustion; the LIMIT is
        // enforced driver-side.
        let rows = collect_rows(first_page).await?;
        rows.iter().map(Self::row_to_widget).collect()
    }

    /// Insert unconditionally (last-write-wins on duplicate identity) and
    /// resolve to the supplied value.
    pub async fn create(&self, widget: Widget) -> WidgetResult<Widget> {
        let statement = self.bind_create(&widget)?;
        bridge(|callback| self.session.execute(&statement, callback)).await?;
        Ok(widget)
    }

    /// Retrieve by composite identity. Absence is a normal `None`, never
    /// an error.
    pub async fn retrieve(&self, tenant_key: &str, key: &str) -> WidgetResult<Option<Widget>> {
        let statement = self.bind_retrieve(tenant_key, key)?;
        let first_page = bridge(|callback| self.session.execute(&statement, callback));
        // A point select, but a driver may still deliver the row behind
        // an empty leading page; stream until the first row.
        let rows = stream_until(first_page, Vec::new(), |rows: &mut Vec<Row>, row| {
            rows.push(row);
            false
        })
        .await?;
        rows.first().map(Self::row_to_widget).transpose()
    }

    /// Apply `patch` to the record at `(tenant_key, key)`.
    ///
    /// Retrieves the current record (failing `NotFound` if absent),
    /// overlays the patch's present fields, then writes via the strategy
    /// [`WriteStrategy::select`] picks: a targeted rewrite when the
    /// identity is unchanged, or one atomic delete-old/insert-new batch
    /// when it moves, so no intermediate state is externally observable.
    /// Resolves to the candidate record.
    pub async fn update(
        &self,
        tenant_key: &str,
        key: &str,
        patch: &WidgetPatch,
    ) -> WidgetResult<Widget> {
        let current = self
            .retrieve(tenant_key, key)
            .await?
            .ok_or_else(|| StoreError::not_found(tenant_key, key))?;
        let candidate = patch.apply_to(&current);

        match WriteStrategy::select(&current, &candidate) {
            WriteStrategy::Rewrite => {
                let statement = self.bind_update(&current, &candidate)?;
                bridge(|callback| self.session.execute(&statement, callback)).await?;
            }
            WriteStrategy::Move => {
                tracing::debug!(
                    from_tenant = current.tenant_key(),
                    from_key = current.key(),
                    to_tenant = candidate.tenant_key(),
                    to_key = candidate.key(),
                    "identity changed, moving row via atomic batch"
                );
                let batch = [
                    self.bind_delete(current.tenant_key(), current.key())?,
                    self.bind_create(&candidate)?,
                ];
                bridge(|callback| self.session.execute_batch(&batch, callback)).await?;
            }
        }
        Ok(candidate)
    }

    /// Delete by composite identity, failing `NotFound` if absent.
    /// Resolves to the record that was deleted.
    pub async fn delete(&self, tenant_key: &str, key: &str) -> WidgetResult<Widget> {
        let existing = self
            .retrieve(tenant_key, key)
            .await?
            .ok_or_else(|| StoreError::not_found(tenant_key, key))?;
        let statement = self.bind_delete(existing.tenant_key(), existing.key())?;
        bridge(|callback| self.session.execute(&statement, callback)).await?;
        Ok(existing)
    }
}
