//! Call context: cancellation and deadlines.
//!
//! # Responsibilities
//! - Carry a caller-owned cancellation token into every call
//! - Carry an optional deadline
//! - Resolve to the matching cancellation error when either fires
//!
//! # Design Decisions
//! - Built on `tokio_util::sync::CancellationToken` so cancelling a parent
//!   cancels every derived child
//! - Cancellation is checked before the deadline when both have fired

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::InvokeError;

/// Cancellation scope for one or more calls.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a child: cancelled with this context, cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> InvokeError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => InvokeError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => InvokeError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                InvokeError::Cancelled
            }
        }
    }
}
