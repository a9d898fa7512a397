//! Core process state shared across the codebase.

mod state;

pub use state::{is_shutdown, setup_shutdown_handler, shutdown_requested};
