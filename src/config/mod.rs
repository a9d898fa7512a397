//! Client configuration management for `livepatch.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [client], [reload], [hub]
//! ├── error          # ConfigError
//! ├── util           # Config file lookup
//! └── mod.rs         # LiveConfig (this file)
//! ```
//!
//! The file is optional. Every field has a default, and command-line flags
//! override whatever the file sets.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{ClientConfig, HubConfig, ReloadConfig};

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use util::find_config_file;

use crate::{
    cli::{Cli, Commands},
    log,
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing livepatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Page and socket settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Reload cycle timing
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Reload hub settings
    #[serde(default)]
    pub hub: HubConfig,
}

impl LiveConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; a missing file means
    /// defaults. CLI options are applied on top, then everything is validated.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("config"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Watch {
                url,
                socket,
                snapshot,
            } => {
                Self::update_option(&mut self.client.url, url.as_ref());
                if let Some(socket) = socket {
                    self.client.socket = Some(socket.clone());
                }
                if let Some(snapshot) = snapshot {
                    self.client.snapshot = Some(snapshot.clone());
                }
            }
            Commands::Hub { interface, port } => {
                Self::update_option(&mut self.hub.interface, interface.as_ref());
                Self::update_option(&mut self.hub.port, port.as_ref());
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()?;
        self.reload.validate()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> LiveConfig {
    let (parsed, ignored) = LiveConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
