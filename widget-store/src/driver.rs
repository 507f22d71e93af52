//! The abstract store session consumed by the data-access layer.
//!
//! The underlying column-family store is an external collaborator; this
//! module pins down the surface the DAO needs from it: preparing a named,
//! parameterized statement once and reusing it, executing a bound
//! statement asynchronously through a one-shot callback, walking a paged
//! result cursor, and executing a batch of statements atomically.
//!
//! The driver is push-style: every asynchronous operation takes a
//! completion callback and returns a [`CancelToken`] for best-effort
//! cancellation. [`crate::bridge`] adapts that shape into futures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use widget_core::DriverError;

/// Completion callback for one asynchronous driver operation. Invoked
/// exactly once with the outcome; never invoked after cancellation took
/// effect.
pub type Completion<T> = Box<dyn FnOnce(Result<T, DriverError>) + Send + 'static>;

/// Completion callback delivering a result page.
pub type PageCallback = Completion<Box<dyn PagedCursor>>;

/// Best-effort cancellation handle for an in-flight driver operation.
///
/// Cancelling is idempotent and racing a completion is benign: a cancel
/// that arrives after the operation settled is a no-op, not an error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the associated operation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested. Drivers check this before
    /// firing a completion callback.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A value bound to a named statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i32),
}

/// A precompiled, parameterized statement handle.
///
/// Created lazily by [`StoreSession::prepare`], cached per logical
/// operation name for the lifetime of the session, never invalidated (the
/// operation set is fixed and small).
#[derive(Debug, Clone)]
pub struct StatementTemplate {
    id: u64,
    query: String,
}

impl StatementTemplate {
    pub fn new(id: u64, query: impl Into<String>) -> Self {
        Self {
            id,
            query: query.into(),
        }
    }

    /// Store-assigned identifier for this compiled statement.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The parameterized query text this template was compiled from.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Begin binding parameters for one execution of this template.
    pub fn bind(&self) -> BoundStatement {
        BoundStatement {
            template_id: self.id,
            query: self.query.clone(),
            params: HashMap::new(),
        }
    }
}

/// A statement template with its parameters bound, ready to execute.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    template_id: u64,
    query: String,
    params: HashMap<String, BindValue>,
}

impl BoundStatement {
    pub fn set_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), BindValue::Text(value.into()));
        self
    }

    pub fn set_int(mut self, name: &str, value: i32) -> Self {
        self.params.insert(name.to_string(), BindValue::Int(value));
        self
    }

    pub fn template_id(&self) -> u64 {
        self.template_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Look up a bound text parameter by name.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.params.get(name) {
            Some(BindValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Look up a bound integer parameter by name.
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.params.get(name) {
            Some(BindValue::Int(value)) => Some(*value),
            _ => None,
        }
    }
}

/// One row of a result set: named string columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, value: impl Into<String>) -> Self {
        self.columns.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }
}

/// One page of a server-side result cursor.
///
/// The rows of the current page are already buffered in memory; draining
/// them performs no I/O. Fetching the page after this one is a fresh
/// asynchronous driver operation.
pub trait PagedCursor: Send {
    /// Take the rows buffered in the current page, in store-delivered
    /// order. Subsequent calls return nothing.
    fn take_buffered(&mut self) -> Vec<Row>;

    /// Whether the store reports further pages beyond this one.
    fn has_more_pages(&self) -> bool;

    /// Begin fetching the next page. The callback receives the next
    /// cursor position or the fetch failure; it is dropped unfired if the
    /// returned token is cancelled first.
    fn fetch_next_page(self: Box<Self>, callback: PageCallback) -> CancelToken;
}

/// The live store session shared by all operations.
///
/// Implementations must be safe to share across concurrent callers; the
/// access layer performs no locking of its own around session use.
pub trait StoreSession: Send + Sync {
    /// Compile a named-parameter statement against the live session.
    /// Must be safe to invoke more than once for the same text (the
    /// statement cache tolerates a benign compile race).
    fn prepare(&self, query: &str) -> Result<StatementTemplate, DriverError>;

    /// Execute a bound statement, invoking the callback exactly once with
    /// the first result page or the failure.
    fn execute(&self, statement: &BoundStatement, callback: PageCallback) -> CancelToken;

    /// Execute a batch of bound statements as a single atomic unit: no
    /// intermediate state between the statements is externally
    /// observable.
    fn execute_batch(&self, statements: &[BoundStatement], callback: PageCallback) -> CancelToken;
}
