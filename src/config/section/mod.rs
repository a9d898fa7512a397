//! Configuration section definitions.
//!
//! Each module corresponds to a section in `livepatch.toml`:
//!
//! | Module   | TOML Section | Purpose                               |
//! |----------|--------------|---------------------------------------|
//! | `client` | `[client]`   | Page url, reload socket, snapshot     |
//! | `reload` | `[reload]`   | Retry budget and cycle timing         |
//! | `hub`    | `[hub]`      | Reload hub interface and port         |

mod client;
mod hub;
mod reload;

pub use client::ClientConfig;
pub use hub::HubConfig;
pub use reload::ReloadConfig;
