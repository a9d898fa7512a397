//! `hub` command: broadcast reload signals typed on stdin.
//!
//! Stands in for a dev server's reload endpoint when driving `watch` by hand
//! or from a script (`echo reload | livepatch hub` style pipelines).

use std::io::BufRead;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};

use crate::config::LiveConfig;
use crate::core::is_shutdown;
use crate::logger::{status_success, status_warning};
use crate::reload::Signal;
use crate::reload::connection::RELOAD_PATH;
use crate::reload::hub::ReloadHub;
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// How often the loop checks for Ctrl+C
const POLL: Duration = Duration::from_millis(100);

/// Run the hub until Ctrl+C.
pub fn run_hub(config: &LiveConfig) -> Result<()> {
    let hub = ReloadHub::start(config.hub.interface, config.hub.port)?;
    if hub.port() != config.hub.port {
        log!("hub"; "port {} in use, using {} instead", config.hub.port, hub.port());
    }
    log!("hub"; "listening on ws://{}:{}{}", config.hub.interface, hub.port(), RELOAD_PATH);
    log!("hub"; "type `reload` or `full` to broadcast");

    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    while !is_shutdown() {
        match lines.recv_timeout(POLL) {
            Ok(line) => handle_line(&hub, line.trim()),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // stdin closed: keep serving until Ctrl+C
                debug!("hub"; "stdin closed");
                lines = channel::never();
            }
        }
    }

    log!("hub"; "closing {}", plural_count(hub.client_count(), "client"));
    Ok(())
}

/// Forward lines from `input` until it ends or the receiver is dropped.
fn spawn_line_reader(input: impl BufRead + Send + 'static) -> Receiver<String> {
    let (tx, rx) = channel::unbounded();
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn handle_line(hub: &ReloadHub, line: &str) {
    if line.is_empty() {
        return;
    }
    match Signal::parse(line) {
        Some(signal) => {
            let sent = hub.broadcast(signal);
            status_success(&format!("sent `{signal}` to {}", plural_count(sent, "client")));
        }
        None => status_warning(&format!("unknown signal `{line}` (expected `reload` or `full`)")),
    }
}
