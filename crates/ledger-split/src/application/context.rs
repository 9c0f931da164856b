//! Invocation context: caller-supplied cancellation and deadline.
//!
//! Cancellation is a `watch` channel flag, set once by the host. Every port
//! call made by the service is raced against it with [`InvocationContext::run`].

use crate::domain::LedgerError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Host side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every context created from this handle.
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left.
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Cancellation and deadline of one entry-operation invocation.
#[derive(Clone, Debug, Default)]
pub struct InvocationContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl InvocationContext {
    /// Context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// New cancellable context plus the handle that cancels it.
    pub fn cancellable() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            Self {
                cancel: Some(rx),
                deadline: None,
            },
        )
    }

    /// Context cancelled when `rx` flips to `true`.
    pub fn with_cancel(rx: watch::Receiver<bool>) -> Self {
        Self {
            cancel: Some(rx),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the invocation was aborted.
    pub fn check(&self) -> Result<(), LedgerError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Err(LedgerError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(LedgerError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves once the context is cancelled. Never resolves otherwise.
    async fn cancelled(&self) {
        let Some(rx) = &self.cancel else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Host dropped the handle without cancelling.
                return std::future::pending().await;
            }
        }
    }

    /// Run `fut` unless the invocation is cancelled or times out first.
    ///
    /// A future that loses the race is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = T>,
    {
        self.check()?;
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancelled() => Err(LedgerError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => Err(LedgerError::DeadlineExceeded),
                out = fut => Ok(out),
            },
            None => tokio::select! {
                biased;
                _ = self.cancelled() => Err(LedgerError::Cancelled),
                out = fut => Ok(out),
            },
        }
    }
}
