//! Command-line interface module.

mod args;
pub mod hub;
pub mod watch;

pub use args::{Cli, Commands};
