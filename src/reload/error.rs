//! Reload error types.

use thiserror::Error;

use crate::dom::ParseError;
use crate::reconcile::ReconcileError;

/// A single failed page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("server answered {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("expected text/html, got `{0}`")]
    NotHtml(String),

    #[error("fetch task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Whether another attempt may succeed (server restarting or recompiling).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Network(_))
    }
}

/// Failure of a patch cycle. Always ends in a full reload.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("server not ready after {attempts} attempt(s)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: FetchError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
