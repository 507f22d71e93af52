//! Paginated Row Streamer: drain a paged cursor without blocking.
//!
//! A server-side result set arrives one page at a time; iterating past
//! the buffered rows of the current page would otherwise block a thread
//! on a network fetch. [`stream_until`] folds the buffered rows of each
//! page into an accumulator and chains into the next page fetch as a new
//! asynchronous continuation, so the loop suspends between pages and does
//! CPU-only work within one.

use widget_core::WidgetResult;

use crate::bridge::{bridge, BridgedFuture};
use crate::driver::{PagedCursor, Row};

/// Stream rows from a paged cursor into `seed` until `step` declines or
/// the pages run out.
///
/// `step(accumulator, row) -> bool` returns whether streaming should
/// continue. Invariants:
/// - rows are visited in store-delivered order, each exactly once
/// - the fetch for page N+1 is issued only after page N's buffered rows
///   are fully consumed or streaming stopped early
/// - at most one page fetch is outstanding at a time
/// - a page-fetch failure discards the accumulator and fails the future
pub async fn stream_until<A, F>(
    first_page: BridgedFuture<Box<dyn PagedCursor>>,
    seed: A,
    mut step: F,
) -> WidgetResult<A>
where
    F: FnMut(&mut A, Row) -> bool,
{
    let mut cursor = first_page.await?;
    let mut accumulator = seed;
    loop {
        let mut continue_streaming = true;
        for row in cursor.take_buffered() {
            continue_streaming = step(&mut accumulator, row);
            if !continue_streaming {
                break;
            }
        }

        if !continue_streaming || !cursor.has_more_pages() {
            return Ok(accumulator);
        }

        cursor = bridge(move |callback| cursor.fetch_next_page(callback)).await?;
    }
}

/// Drain every row of the cursor, in order.
pub async fn collect_rows(
    first_page: BridgedFuture<Box<dyn PagedCursor>>,
) -> WidgetResult<Vec<Row>> {
    stream_until(first_page, Vec::new(), |rows, row| {
        rows.push(row);
        true
    })
    .await
}
