//! Per-command cancellation context.
//!
//! Cancellation is cooperative: every persistence call checks the context
//! before it touches the pool. A query that already started only stops when
//! the deadline elapses, never because the token was cancelled mid-flight.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, GuildError, GuildResult};

#[derive(Debug, Clone, Default)]
pub struct Ctx {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Ctx {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// A child sharing this context's deadline; cancelling the parent
    /// cancels the child.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reason this context is done, if it is.
    pub fn done(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail fast with [`GuildError::Cancelled`] when the context is done.
    pub fn check(&self, operation: &'static str) -> GuildResult<()> {
        match self.done() {
            Some(reason) => Err(GuildError::Cancelled { operation, reason }),
            None => Ok(()),
        }
    }

    /// Run one query future under this context: refuse to start when done,
    /// abandon it when the deadline passes.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> GuildResult<Result<T, sqlx::Error>>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        self.check(operation)?;
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut).await.map_err(|_| {
                GuildError::Cancelled {
                    operation,
                    reason: CancelReason::DeadlineExceeded,
                }
            }),
            None => Ok(fut.await),
        }
    }
}
