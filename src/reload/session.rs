//! One page session.
//!
//! A session lives from page load until the next full reload. It pulls
//! events from the connection, runs at most one reload cycle at a time, and
//! ends with the reason the page must be reloaded.
//!
//! Events that arrive while a cycle runs stay in the channel. Before the next
//! cycle they are drained and coalesced, so a burst of saves costs one patch:
//!
//! ```text
//! [reload, reload, reload] -> Patch
//! [reload, full]           -> Full
//! [full, closed]           -> Closed
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;

use super::connection::Event;
use super::fetch::Fetch;
use super::orchestrator::{CycleOutcome, ReloadOrchestrator, ReloadReason};
use super::signal::Signal;
use crate::core::shutdown_requested;
use crate::reconcile::{LiveDocument, ReconcileReport};

/// Delay between channel loss and the full reload it triggers.
pub const CLOSE_GRACE: Duration = Duration::from_millis(1000);

/// Work owed after a batch of events. Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pending {
    Nothing,
    Patch,
    Full,
    Closed,
}

/// Collapse a batch of events into the single action it requires.
pub fn coalesce(events: impl IntoIterator<Item = Event>) -> Pending {
    events
        .into_iter()
        .map(|event| match event {
            Event::Closed(_) => Pending::Closed,
            Event::Signal(token) => match Signal::parse(&token) {
                Some(Signal::Full) => Pending::Full,
                Some(Signal::Patch) => Pending::Patch,
                None => {
                    crate::debug!("ws"; "ignoring unknown message `{}`", token);
                    Pending::Nothing
                }
            },
        })
        .max()
        .unwrap_or(Pending::Nothing)
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The page must be loaded again
    Reload(ReloadReason),
    /// Ctrl+C
    Shutdown,
}

/// Resolves when the session must stop, whatever it is doing.
type Stop<'a> = Pin<Box<dyn Future<Output = ()> + 'a>>;

pub struct Session<'a, F> {
    orchestrator: &'a mut ReloadOrchestrator<F>,
    events: mpsc::Receiver<Event>,
    close_grace: Duration,
    stop: Stop<'a>,
}

impl<'a, F: Fetch> Session<'a, F> {
    pub fn new(orchestrator: &'a mut ReloadOrchestrator<F>, events: mpsc::Receiver<Event>) -> Self {
        Self {
            orchestrator,
            events,
            close_grace: CLOSE_GRACE,
            stop: Box::pin(shutdown_requested()),
        }
    }

    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }

    /// Stop on `stop` instead of Ctrl+C.
    #[cfg(test)]
    pub fn with_stop(mut self, stop: impl Future<Output = ()> + 'a) -> Self {
        self.stop = Box::pin(stop);
        self
    }

    /// Process events until the page has to be reloaded.
    ///
    /// `on_patch` runs after every successful patch with the updated page.
    /// Ctrl+C interrupts a running cycle, including its retry sleeps.
    pub async fn run<D, P>(&mut self, live: &mut D, mut on_patch: P) -> SessionEnd
    where
        D: LiveDocument,
        P: FnMut(&D, &ReconcileReport),
    {
        loop {
            let first = tokio::select! {
                event = self.events.recv() => {
                    event.unwrap_or_else(|| Event::Closed("connection dropped".into()))
                }
                () = &mut self.stop => return SessionEnd::Shutdown,
            };

            let mut batch = vec![first];
            while let Ok(event) = self.events.try_recv() {
                batch.push(event);
            }

            let signal = match coalesce(batch) {
                Pending::Nothing => continue,
                Pending::Closed => return self.grace().await,
                Pending::Full => Signal::Full,
                Pending::Patch => Signal::Patch,
            };

            let outcome = tokio::select! {
                outcome = self.orchestrator.handle_signal(signal, live) => outcome,
                () = &mut self.stop => return SessionEnd::Shutdown,
            };
            match outcome {
                CycleOutcome::Patched(report) => on_patch(&*live, &report),
                CycleOutcome::FullReload(reason) => return SessionEnd::Reload(reason),
            }
        }
    }

    async fn grace(&mut self) -> SessionEnd {
        crate::debug!("ws"; "connection closed, reloading in {:?}", self.close_grace);
        tokio::select! {
            () = tokio::time::sleep(self.close_grace) => {
                SessionEnd::Reload(ReloadReason::ConnectionLost)
            }
            () = &mut self.stop => SessionEnd::Shutdown,
        }
    }
}
