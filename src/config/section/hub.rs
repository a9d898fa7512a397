//! `[hub]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [hub]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3001                 # First port to try
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::reload::connection::DEFAULT_SOCKET_PORT;

/// Reload hub settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// Base port. The next free port is used when it is taken.
    pub port: u16,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: DEFAULT_SOCKET_PORT,
        }
    }
}
