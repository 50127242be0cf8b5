use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq)]
pub enum Debounced<T> {
    Ran(T),
    /// A later request arrived before the delay elapsed.
    Superseded,
}

/// Runs only the last of a burst of requests, `delay` after it was made.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Drops whatever request is still waiting out its delay.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
    }

    /// Waits out the delay, then runs `task` unless a newer request or a
    /// cancel came in first. Once started, `task` runs to completion.
    pub async fn run<F, Fut, T>(&self, task: F) -> Debounced<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let token = self.arm();
        tokio::select! {
            _ = token.cancelled() => Debounced::Superseded,
            _ = tokio::time::sleep(self.delay) => Debounced::Ran(task().await),
        }
    }
}
