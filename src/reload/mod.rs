//! Reload Module
//!
//! Client side of live reload, plus the hub that feeds it.
//!
//! # Architecture
//!
//! ```text
//! ReloadHub --ws--> connection --Event--> Session --Signal--> ReloadOrchestrator
//!                                                                 |
//!                                     fetch_with_retry -> parse -> Reconciler
//! ```
//!
//! Every failure on the patch path, and every loss of the channel, ends the
//! session with a full reload.
//!
//! # Modules
//!
//! - `connection` - Reload channel reader (one socket per page load)
//! - `error` - Fetch and reload cycle errors
//! - `fetch` - Page fetching over HTTP
//! - `hub` - WebSocket broadcaster for `/__reload`
//! - `orchestrator` - Signal to reload cycle
//! - `retry` - Bounded fetch retry
//! - `session` - Event loop of one page load, with coalescing
//! - `signal` - Wire tokens `full` / `reload`

pub mod connection;
pub mod error;
mod fetch;
pub mod hub;
mod orchestrator;
mod retry;
pub mod session;
mod signal;

pub use fetch::{Fetch, HttpFetcher};
pub use orchestrator::{ReloadOrchestrator, ReloadReason};
pub use retry::RetryPolicy;
pub use session::{Session, SessionEnd};
pub use signal::Signal;
