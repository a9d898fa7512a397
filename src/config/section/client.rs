//! `[client]` section configuration.
//!
//! Which page the client loads and where it listens for reload signals.
//!
//! # Example
//!
//! ```toml
//! [client]
//! url = "http://localhost:3000/"           # Page to load and patch
//! socket = "ws://localhost:3001/__reload"  # Default: page host, port 3001
//! snapshot = "live.html"                   # Write the live page here after each change
//! ```

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigError;
use crate::reload::connection::default_endpoint;

/// Page and reload channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Page to load. Fetched again on every patch.
    pub url: Url,

    /// Reload channel endpoint. Derived from `url` when unset.
    pub socket: Option<Url>,

    /// Where to write the rendered live page.
    pub snapshot: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:3000/").expect("static url"),
            socket: None,
            snapshot: None,
        }
    }
}

impl ClientConfig {
    /// Configured endpoint, or `ws://<page host>:3001/__reload`.
    pub fn socket_url(&self) -> Result<Url> {
        match &self.socket {
            Some(socket) => Ok(socket.clone()),
            None => default_endpoint(&self.url),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "client.url must be http(s), got `{}`",
                self.url
            )));
        }
        if self.url.host_str().is_none() {
            return Err(ConfigError::Validation(format!(
                "client.url `{}` has no host",
                self.url
            )));
        }
        if let Some(socket) = &self.socket
            && socket.scheme() != "ws"
        {
            return Err(ConfigError::Validation(format!(
                "client.socket must be a ws:// url, got `{socket}`"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_client_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.client.url.as_str(), "http://localhost:3000/");
        assert!(config.client.socket.is_none());
        assert!(config.client.snapshot.is_none());
        assert_eq!(
            config.client.socket_url().unwrap().as_str(),
            "ws://localhost:3001/__reload"
        );
    }

    #[test]
    fn test_client_config_override() {
        let config = test_parse_config(
            "[client]\nurl = \"http://127.0.0.1:8080/docs/\"\nsnapshot = \"live.html\"",
        );

        assert_eq!(config.client.url.as_str(), "http://127.0.0.1:8080/docs/");
        assert_eq!(
            config.client.socket_url().unwrap().as_str(),
            "ws://127.0.0.1:3001/__reload"
        );
        assert_eq!(config.client.snapshot.as_deref(), Some("live.html".as_ref()));
    }

    #[test]
    fn test_explicit_socket() {
        let config = test_parse_config("[client]\nsocket = \"ws://localhost:9000/__reload\"");
        assert_eq!(
            config.client.socket_url().unwrap().as_str(),
            "ws://localhost:9000/__reload"
        );
        assert!(config.client.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_schemes() {
        let config = test_parse_config("[client]\nurl = \"ftp://localhost/\"");
        assert!(config.client.validate().is_err());

        let config = test_parse_config("[client]\nsocket = \"wss://localhost:3001/__reload\"");
        assert!(config.client.validate().is_err());
    }
}
