//! Future Bridge: one callback-based driver operation as a future.
//!
//! The driver pushes completions through `FnOnce` callbacks; the rest of
//! the pipeline composes futures. [`bridge`] adapts one operation between
//! the two shapes: the completion callback fulfils a single-assignment
//! slot (a oneshot channel) exactly once, and dropping the unresolved
//! future forwards cancellation to the driver's [`CancelToken`]. The
//! bridge itself never blocks; the future resolves on whatever thread the
//! driver's callback fires on.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use widget_core::{DriverError, StoreError, WidgetResult};

use crate::driver::{CancelToken, Completion};

/// Bridge a single callback-based operation into a future.
///
/// `register` is handed the one-shot completion callback and must start
/// the operation, returning the driver's cancellation token. It runs
/// synchronously, so the operation is in flight by the time this function
/// returns.
///
/// Outcome mapping:
/// - callback fired with `Ok(value)` - future resolves `Ok(value)`
/// - callback fired with `Err(cause)` - future resolves
///   `Err(StoreError::Execution(cause))`, the cause unmodified
/// - callback dropped unfired (driver abandoned or cancelled the
///   operation) - future resolves `Err(StoreError::Cancelled)`
pub fn bridge<T, F>(register: F) -> BridgedFuture<T>
where
    T: Send + 'static,
    F: FnOnce(Completion<T>) -> CancelToken,
{
    let (tx, rx) = oneshot::channel();
    let completion: Completion<T> = Box::new(move |outcome: Result<T, DriverError>| {
        // The receiver may already be gone (caller dropped the future);
        // a completion arriving after that is a no-op, not an error.
        let _ = tx.send(outcome);
    });
    let token = register(completion);
    BridgedFuture {
        rx,
        token: Some(token),
        resolved: false,
    }
}

/// Future returned by [`bridge`].
///
/// Dropping it before resolution requests cancellation of the underlying
/// driver operation; dropping it afterwards does nothing.
pub struct BridgedFuture<T> {
    rx: oneshot::Receiver<Result<T, DriverError>>,
    token: Option<CancelToken>,
    resolved: bool,
}

impl<T> Future for BridgedFuture<T> {
    type Output = WidgetResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => {
                this.resolved = true;
                // Completion already happened; never fire a late cancel.
                this.token = None;
                Poll::Ready(outcome.map_err(StoreError::Execution))
            }
            Poll::Ready(Err(_)) => {
                // Sender dropped without firing: the driver walked away
                // from the operation.
                this.resolved = true;
                this.token = None;
                Poll::Ready(Err(StoreError::Cancelled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for BridgedFuture<T> {
    fn drop(&mut self) {
        if !self.resolved {
            if let Some(token) = self.token.take() {
                token.cancel();
            }
        }
    }
}
