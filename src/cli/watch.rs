//! `watch` command: keep a live page in sync with the dev server.
//!
//! ```text
//! loop {
//!     load page            (full reload: fresh document)
//!     open reload channel  (fresh socket)
//!     session: patch in place until a full reload is needed
//! }
//! ```

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::config::LiveConfig;
use crate::core::shutdown_requested;
use crate::dom::{Document, scan_islands};
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::reconcile::{HydrateHook, ReconcileReport, Reconciler};
use crate::reload::{
    Fetch, HttpFetcher, ReloadOrchestrator, ReloadReason, Session, SessionEnd, connection,
};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Events buffered while a cycle runs
const EVENT_BUFFER: usize = 64;

/// Run the client until Ctrl+C.
pub fn run_watch(config: &LiveConfig) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    rt.block_on(watch(config))
}

async fn watch(config: &LiveConfig) -> Result<()> {
    let page_url = config.client.url.clone();
    let endpoint = config.client.socket_url()?;
    let snapshot = config.client.snapshot.as_deref();

    let reconciler = Reconciler::new(&page_url)
        .with_frame(config.reload.frame())
        .with_hook(HydrateHook::new(|| debug!("reload"; "islands handed over for re-activation")));
    let mut orchestrator =
        ReloadOrchestrator::new(page_url, HttpFetcher::new(config.reload.request_timeout()))
            .with_retry(config.reload.retry_policy())
            .with_reconciler(reconciler);

    log!("watch"; "page {}", orchestrator.page_url());
    log!("watch"; "reload channel {}", endpoint);

    loop {
        let Some(mut live) = navigate(&orchestrator, config.reload.close_grace()).await else {
            return Ok(());
        };
        status_unchanged(&format!("loaded {}, waiting for changes", orchestrator.page_url()));
        after_change(&live, snapshot);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        connection::open(endpoint.clone(), tx);

        let end = Session::new(&mut orchestrator, rx)
            .with_close_grace(config.reload.close_grace())
            .run(&mut live, |page: &Document, report: &ReconcileReport| {
                status_success(&format!("patched: {}", report.summary()));
                after_change(page, snapshot);
            })
            .await;

        match end {
            SessionEnd::Shutdown => return Ok(()),
            SessionEnd::Reload(ReloadReason::PatchFailed(err)) => {
                status_error("patch failed, full reload", &error_chain(&err));
            }
            SessionEnd::Reload(reason) => status_warning(&format!("full reload: {reason}")),
        }
    }
}

/// Load the page, retrying after the grace period while the server is down.
///
/// `None` when shutdown was requested.
async fn navigate<F: Fetch>(
    orchestrator: &ReloadOrchestrator<F>,
    retry_after: Duration,
) -> Option<Document> {
    loop {
        let loaded = tokio::select! {
            loaded = orchestrator.load() => loaded,
            () = shutdown_requested() => return None,
        };
        match loaded {
            Ok(doc) => return Some(doc),
            Err(err) => status_error(
                &format!("cannot load {}", orchestrator.page_url()),
                &error_chain(&err),
            ),
        }
        tokio::select! {
            () = tokio::time::sleep(retry_after) => {}
            () = shutdown_requested() => return None,
        }
    }
}

/// Island report and snapshot after every load or patch.
fn after_change(page: &Document, snapshot: Option<&Path>) {
    let scan = scan_islands(page);
    if !scan.islands.is_empty() {
        debug!("reload"; "{}: {}", plural_count(scan.islands.len(), "island"), scan.names().join(", "));
    }
    for island in &scan.islands {
        debug!("reload"; "{} props {}", island.name, island.props);
    }
    for (name, err) in &scan.invalid {
        log!("reload"; "island {} has invalid data-props: {}", name, err);
    }

    if let Some(path) = snapshot
        && let Err(e) = write_snapshot(page, path)
    {
        log!("error"; "{:#}", e);
    }
}

fn write_snapshot(page: &Document, path: &Path) -> Result<()> {
    std::fs::write(path, page.render())
        .with_context(|| format!("failed to write snapshot {}", path.display()))
}

/// `err: source: source ...`
fn error_chain(err: &dyn Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
