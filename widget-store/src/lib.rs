//! Widget Store - Asynchronous Data-Access Layer
//!
//! Bridges a callback-style, paged store driver into composable,
//! cancellable futures and exposes the five widget operations on top of
//! it. The pieces, leaves first:
//!
//! - [`driver`] - the abstract store session: prepared statement
//!   templates, bound statements, paged result cursors, and the
//!   callback/cancel-token contract the driver exposes.
//! - [`bridge`] - converts one callback-based operation into a future,
//!   preserving cancellation.
//! - [`statements`] - the compute-once-per-name prepared statement cache.
//! - [`stream`] - drains a multi-page result cursor without blocking a
//!   thread between page fetches.
//! - [`dao`] - the record access layer composing the above, including the
//!   rewrite-vs-move write strategy for identity-changing updates.
//! - [`mem`] - an in-memory session used by tests and the dev server.

pub mod bridge;
pub mod dao;
pub mod driver;
pub mod mem;
pub mod statements;
pub mod stream;

pub use bridge::{bridge, BridgedFuture};
pub use dao::{WidgetDao, WriteStrategy};
pub use driver::{
    BindValue, BoundStatement, CancelToken, Completion, PageCallback, PagedCursor, Row,
    StatementTemplate, StoreSession,
};
pub use mem::InMemorySession;
pub use statements::StatementCache;
pub use stream::{collect_rows, stream_until};
