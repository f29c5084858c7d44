//! Per-call cancellation and deadline.
//!
//! Every operation takes a [`RequestContext`] as its first argument after the
//! client. Cancelling the context (or letting its deadline pass) aborts the
//! in-flight request and surfaces [`RedmineError::Cancelled`] or
//! [`RedmineError::DeadlineExceeded`], never a server-side error.
//!
//! [`RedmineError::Cancelled`]: crate::RedmineError::Cancelled
//! [`RedmineError::DeadlineExceeded`]: crate::RedmineError::DeadlineExceeded

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{RedmineError, Result};

/// Cancellation signal and optional deadline for a single call.
///
/// Cloning shares the underlying token, so a context handed to several calls
/// cancels all of them at once.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use redmine_api::RequestContext;
///
/// let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));
/// let token = ctx.cancellation_token();
/// // elsewhere: token.cancel();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the context to an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Fail the call if it has not completed by `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fail the call if it has not completed within `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The token that cancels this context.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel every call bound to this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `fut` under this context.
    ///
    /// Returns without polling `fut` when the context is already cancelled or
    /// expired, so no request leaves the process.
    pub(crate) async fn run<F, T>(&self, endpoint: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(RedmineError::Cancelled {
                endpoint: endpoint.to_string(),
            });
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(RedmineError::DeadlineExceeded {
                endpoint: endpoint.to_string(),
            });
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => Err(RedmineError::Cancelled {
                    endpoint: endpoint.to_string(),
                }),
                result = fut => result,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or_else(|_| {
                    Err(RedmineError::DeadlineExceeded {
                        endpoint: endpoint.to_string(),
                    })
                }),
            None => guarded.await,
        }
    }
}
