//! In-memory store session for tests and the development server.
//!
//! Backs the [`StoreSession`] contract with a `BTreeMap` keyed by the
//! composite `(tenant_key, key)` identity, so tenant-scoped key-range
//! scans come out in ascending key order for free. Completions are
//! delivered from a spawned task, which keeps the callback timing honest:
//! callers observe the same "fires on another thread, later" behavior the
//! real driver exhibits.
//!
//! The session interprets exactly the statement shapes the DAO issues,
//! dispatching on the leading keyword and the named parameters (a point
//! SELECT binds `:key`, a range SELECT binds `:offset_key` and
//! `:result_limit`). Batches apply all statements under one lock
//! acquisition, so no intermediate state is observable.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use widget_core::DriverError;

use crate::dao::fields;
use crate::driver::{
    BoundStatement, CancelToken, PageCallback, PagedCursor, Row, StatementTemplate, StoreSession,
};

type RowMap = BTreeMap<(String, String), String>;

/// In-memory [`StoreSession`] with configurable result paging,
/// observable prepare/page-fetch counters, and injectable execution
/// failures.
pub struct InMemorySession {
    rows: Arc<RwLock<RowMap>>,
    page_size: usize,
    prepares: AtomicU64,
    next_template_id: AtomicU64,
    page_fetches: Arc<AtomicU64>,
    // Remaining executes to let through before failing one.
    planned_failure: Mutex<Option<(u64, DriverError)>>,
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    /// A session whose result sets page at `page_size` rows.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
            prepares: AtomicU64::new(0),
            next_template_id: AtomicU64::new(1),
            page_fetches: Arc::new(AtomicU64::new(0)),
            planned_failure: Mutex::new(None),
        }
    }

    /// Total `prepare` calls observed, across all statement texts.
    pub fn prepare_calls(&self) -> u64 {
        self.prepares.load(Ordering::SeqCst)
    }

    /// Total follow-up page fetches issued against this session's
    /// cursors (the first page of each execution is not counted).
    pub fn page_fetches(&self) -> u64 {
        self.page_fetches.load(Ordering::SeqCst)
    }

    /// Number of rows currently stored.
    pub fn row_count(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Fail the next `execute`/`execute_batch` with the given message.
    pub fn fail_next_execute(&self, message: impl Into<String>) {
        self.fail_execute_after(0, message);
    }

    /// Let `skips` executes succeed, then fail the one after them with
    /// the given message. Batches count as one execute. Lets a test aim
    /// the failure at a specific step of a multi-statement operation,
    /// such as the write that follows an update's internal retrieve.
    pub fn fail_execute_after(&self, skips: u64, message: impl Into<String>) {
        if let Ok(mut slot) = self.planned_failure.lock() {
            *slot = Some((skips, DriverError::new(message)));
        }
    }

    fn take_due_failure(&self) -> Option<DriverError> {
        let mut slot = self.planned_failure.lock().ok()?;
        match slot.as_mut() {
            Some((0, _)) => slot.take().map(|(_, err)| err),
            Some((skips, _)) => {
                *skips -= 1;
                None
            }
            None => None,
        }
    }

    // ========================================================================
    // STATEMENT INTERPRETATION
    // ========================================================================

    fn run_statements(
        rows: &RwLock<RowMap>,
        statements: &[BoundStatement],
    ) -> Result<Vec<Row>, DriverError> {
        // One lock acquisition for the whole slice: a batch is atomic.
        let mut guard = rows
            .write()
            .map_err(|_| DriverError::new("row store lock poisoned"))?;
        let mut result = Vec::new();
        for statement in statements {
            result.extend(Self::apply(&mut guard, statement)?);
        }
        Ok(result)
    }

    fn apply(rows: &mut RowMap, statement: &BoundStatement) -> Result<Vec<Row>, DriverError> {
        let keyword = statement
            .query()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" => Self::apply_select(rows, statement),
            "INSERT" | "UPDATE" => {
                // The store treats both as an upsert of the full row; the
                // DAO only issues UPDATE against a row it just retrieved.
                let tenant_key = Self::required_text(statement, "tenant_key")?;
                let key = Self::required_text(statement, "key")?;
                let description = Self::required_text(statement, "description")?;
                rows.insert(
                    (tenant_key.to_string(), key.to_string()),
                    description.to_string(),
                );
                Ok(Vec::new())
            }
            "DELETE" => {
                let tenant_key = Self::required_text(statement, "tenant_key")?;
                let key = Self::required_text(statement, "key")?;
                rows.remove(&(tenant_key.to_string(), key.to_string()));
                Ok(Vec::new())
            }
            other => Err(DriverError::new(format!(
                "unsupported statement keyword: {:?}",
                other
            ))),
        }
    }

    fn apply_select(
        rows: &RowMap,
        statement: &BoundStatement,
    ) -> Result<Vec<Row>, DriverError> {
        let tenant_key = Self::required_text(statement, "tenant_key")?;

        // A range scan binds :offset_key; a point lookup binds :key.
        if let Some(offset_key) = statement.text("offset_key") {
            let limit = statement
                .int("result_limit")
                .map(|limit| limit.max(0) as usize)
                .unwrap_or(usize::MAX);
            let start = Bound::Excluded((tenant_key.to_string(), offset_key.to_string()));
            let matches = rows
                .range((start, Bound::Unbounded))
                .take_while(|((tenant, _), _)| tenant == tenant_key)
                .take(limit)
                .map(|((tenant, key), description)| {
                    Self::stored_row(tenant, key, description)
                })
                .collect();
            Ok(matches)
        } else {
            let key = Self::required_text(statement, "key")?;
            let identity = (tenant_key.to_string(), key.to_string());
            Ok(rows
                .get(&identity)
                .map(|description| Self::stored_row(tenant_key, key, description))
                .into_iter()
                .collect())
        }
    }

    fn stored_row(tenant_key: &str, key: &str, description: &str) -> Row {
        Row::new()
            .with_column(fields::TENANT_KEY, tenant_key)
            .with_column(fields::KEY, key)
            .with_column(fields::DESCRIPTION, description)
    }

    fn required_text<'a>(
        statement: &'a BoundStatement,
        name: &str,
    ) -> Result<&'a str, DriverError> {
        statement
            .text(name)
            .ok_or_else(|| DriverError::new(format!("statement is missing parameter :{}", name)))
    }

    fn run(&self, statements: Vec<BoundStatement>, callback: PageCallback) -> CancelToken {
        let token = CancelToken::new();
        let guard = token.clone();
        let rows = Arc::clone(&self.rows);
        let page_size = self.page_size;
        let page_fetches = Arc::clone(&self.page_fetches);
        // Decided at submission time, so the Nth execute fails even when
        // completions race.
        let injected = self.take_due_failure();
        tokio::spawn(async move {
            let outcome = match injected {
                Some(err) => Err(err),
                None => Self::run_statements(&rows, &statements)
                    .map(|result| InMemoryCursor::paginate(result, page_size, page_fetches)),
            };
            // A cancelled operation never fires its callback.
            if guard.is_cancelled() {
                return;
            }
            callback(outcome);
        });
        token
    }
}

impl StoreSession for InMemorySession {
    fn prepare(&self, query: &str) -> Result<StatementTemplate, DriverError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        let id = self.next_template_id.fetch_add(1, Ordering::SeqCst);
        Ok(StatementTemplate::new(id, query))
    }

    fn execute(&self, statement: &BoundStatement, callback: PageCallback) -> CancelToken {
        self.run(vec![statement.clone()], callback)
    }

    fn execute_batch(&self, statements: &[BoundStatement], callback: PageCallback) -> CancelToken {
        self.run(statements.to_vec(), callback)
    }
}

/// Cursor over a result set snapshot, sliced into fixed-size pages.
struct InMemoryCursor {
    buffered: Vec<Row>,
    remaining: VecDeque<Vec<Row>>,
    fetches: Arc<AtomicU64>,
}

impl InMemoryCursor {
    fn paginate(
        result: Vec<Row>,
        page_size: usize,
        fetches: Arc<AtomicU64>,
    ) -> Box<dyn PagedCursor> {
        let mut pages: VecDeque<Vec<Row>> = result
            .chunks(page_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        let buffered = pages.pop_front().unwrap_or_default();
        Box::new(Self {
            buffered,
            remaining: pages,
            fetches,
        })
    }
}

impl PagedCursor for InMemoryCursor {
    fn take_buffered(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.buffered)
    }

    fn has_more_pages(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn fetch_next_page(mut self: Box<Self>, callback: PageCallback) -> CancelToken {
        let token = CancelToken::new();
        let guard = token.clone();
        tokio::spawn(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.buffered = self.remaining.pop_front().unwrap_or_default();
            if guard.is_cancelled() {
                return;
            }
            callback(Ok(self as Box<dyn PagedCursor>));
        });
        token
    }
}
