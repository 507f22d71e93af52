//! Statement Cache: one compiled template per logical operation name.
//!
//! Compute-if-absent semantics over a concurrent map. Under a concurrent
//! first access the builder may run more than once (the driver's
//! `prepare` must tolerate that), but exactly one template wins and every
//! caller from then on receives the winner. There is no eviction: the
//! operation-name set is static and known at startup.

use dashmap::DashMap;
use widget_core::DriverError;

use crate::driver::StatementTemplate;

/// Maps a logical operation name (`"list"`, `"create"`, ...) to the
/// prepared statement compiled for it, at most once per session.
#[derive(Debug, Default)]
pub struct StatementCache {
    templates: DashMap<&'static str, StatementTemplate>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached template for `name`, compiling it through
    /// `build` on first access.
    ///
    /// Losing a compile race is benign: the losing template is discarded
    /// and the winner is returned, so all callers converge on a single
    /// template.
    pub fn get_or_prepare<F>(
        &self,
        name: &'static str,
        build: F,
    ) -> Result<StatementTemplate, DriverError>
    where
        F: FnOnce() -> Result<StatementTemplate, DriverError>,
    {
        if let Some(existing) = self.templates.get(name) {
            return Ok(existing.clone());
        }
        let compiled = build()?;
        let winner = self.templates.entry(name).or_insert(compiled);
        Ok(winner.clone())
    }

    /// Number of operation names with a compiled template.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
