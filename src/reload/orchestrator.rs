//! Reload Orchestrator
//!
//! Turns one signal into one reload cycle:
//!
//! ```text
//! full   -> FullReload(Requested)
//! reload -> fetch (with retry) -> parse -> reconcile -> Patched
//!                    |              |          |
//!                    +--------------+----------+--> FullReload(PatchFailed)
//! ```
//!
//! Every failure on the patch path degrades to a full reload, so the page is
//! never left half-patched or stale.

use std::fmt;

use url::Url;

use super::error::ReloadError;
use super::fetch::Fetch;
use super::retry::{RetryPolicy, fetch_with_retry};
use super::signal::Signal;
use crate::dom::Document;
use crate::reconcile::{LiveDocument, ReconcileReport, Reconciler};

/// Why the page is being reloaded.
#[derive(Debug)]
pub enum ReloadReason {
    /// The server sent `full`
    Requested,
    /// The patch path failed
    PatchFailed(ReloadError),
    /// The reload channel closed
    ConnectionLost,
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("requested by server"),
            Self::PatchFailed(err) => write!(f, "patch failed: {err}"),
            Self::ConnectionLost => f.write_str("connection lost"),
        }
    }
}

/// Result of handling one signal.
#[derive(Debug)]
pub enum CycleOutcome {
    Patched(ReconcileReport),
    FullReload(ReloadReason),
}

pub struct ReloadOrchestrator<F> {
    page_url: Url,
    fetcher: F,
    retry: RetryPolicy,
    reconciler: Reconciler,
}

impl<F: Fetch> ReloadOrchestrator<F> {
    pub fn new(page_url: Url, fetcher: F) -> Self {
        let reconciler = Reconciler::new(&page_url);
        Self {
            page_url,
            fetcher,
            retry: RetryPolicy::default(),
            reconciler,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Fetch and parse the current page.
    pub async fn load(&self) -> Result<Document, ReloadError> {
        let html = fetch_with_retry(&self.fetcher, &self.page_url, &self.retry).await?;
        Ok(Document::parse(&html)?)
    }

    /// Handle one signal against the live page.
    pub async fn handle_signal<D: LiveDocument>(
        &mut self,
        signal: Signal,
        live: &mut D,
    ) -> CycleOutcome {
        match signal {
            Signal::Full => CycleOutcome::FullReload(ReloadReason::Requested),
            Signal::Patch => match self.patch(live).await {
                Ok(report) => CycleOutcome::Patched(report),
                Err(err) => {
                    crate::debug!("reload"; "patch failed, falling back: {}", err);
                    CycleOutcome::FullReload(ReloadReason::PatchFailed(err))
                }
            },
        }
    }

    async fn patch<D: LiveDocument>(&mut self, live: &mut D) -> Result<ReconcileReport, ReloadError> {
        let fetched = self.load().await?;
        Ok(self.reconciler.reconcile(live, &fetched).await?)
    }
}
