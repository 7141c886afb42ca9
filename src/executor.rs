//! Bounded execution: one unit of work raced against a deadline and an
//! optional caller-side cancellation signal.

use crate::Error;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// How a bounded unit of work ended.
#[derive(Debug)]
pub enum ExecOutcome<T> {
    Success(T),
    Failure(Error),
    TimedOut,
    Cancelled,
}

/// Create a linked cancel handle/signal pair.
///
/// The handle side stays with the caller; the signal side travels into the
/// call. Dropping the handle without cancelling never cancels anything.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Caller-held handle used to abort an in-flight call.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// The receiving side of a [`CancelHandle`], passed into an invocation.
#[derive(Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once the paired handle fires. Pends forever if the handle
    /// was dropped without cancelling.
    pub(crate) async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Run `work` to completion unless the deadline or the cancellation signal
/// fires first.
///
/// Losing futures are dropped, which is the cooperative cancellation point:
/// an in-flight HTTP call aborts its connection when its future is dropped,
/// so the executor never keeps work alive past the deadline.
pub async fn run_bounded<T, F>(
    work: F,
    timeout: Duration,
    cancel: Option<CancelSignal>,
) -> ExecOutcome<T>
where
    F: Future<Output = Result<T, Error>>,
{
    let mut cancel = cancel;
    let cancelled = async {
        match cancel.as_mut() {
            Some(signal) => signal.cancelled().await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = work => match result {
            Ok(value) => ExecOutcome::Success(value),
            Err(err) => ExecOutcome::Failure(err),
        },
        _ = tokio::time::sleep(timeout) => ExecOutcome::TimedOut,
        _ = cancelled => ExecOutcome::Cancelled,
    }
}
