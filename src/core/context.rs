// EN: src/core/context.rs

use crate::CancellationToken;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Why a wait was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The caller set the cancellation token.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

/// Cancellation and deadline carried into every execution.
///
/// Derived contexts share the parent's token, so cancelling the parent reaches every
/// child; deadlines only ever get tighter.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// A context that never expires and is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context observing an existing cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            deadline: None,
        }
    }

    /// Derives a context that also expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a context that also expires at `deadline`. The earlier deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            cancellation: Arc::clone(&self.cancellation),
            deadline: Some(deadline),
        }
    }

    /// The token shared by this context and everything derived from it.
    pub fn token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancellation.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.load(Ordering::SeqCst)
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason the context is no longer live, if any.
    pub fn check(&self) -> Result<(), Interruption> {
        if self.is_cancelled() {
            return Err(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interruption::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl From<CancellationToken> for ExecutionContext {
    fn from(token: CancellationToken) -> Self {
        Self::with_cancellation(token)
    }
}

/// A fresh, unset cancellation token.
pub fn new_cancellation_token() -> CancellationToken {
    Arc::new(AtomicBool::new(false))
}
