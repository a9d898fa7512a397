//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use url::Url;

/// Headless live-reload client: patch the page, keep the islands
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: livepatch.toml)
    #[arg(short = 'C', long, default_value = "livepatch.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Show retries, socket traffic and patch details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load a page and keep it in sync with the dev server
    #[command(visible_alias = "w")]
    Watch {
        /// Page to load (e.g., http://localhost:3000/)
        #[arg(value_hint = clap::ValueHint::Url)]
        url: Option<Url>,

        /// Reload channel endpoint (default: ws://<page host>:3001/__reload)
        #[arg(short, long)]
        socket: Option<Url>,

        /// Write the live page to this file after every load and patch
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        snapshot: Option<PathBuf>,
    },

    /// Run a reload hub and broadcast signals typed on stdin
    #[command(visible_alias = "h")]
    Hub {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_args() {
        let cli = Cli::parse_from([
            "livepatch",
            "-v",
            "w",
            "http://localhost:3000/docs",
            "-s",
            "ws://localhost:9000/__reload",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("livepatch.toml"));
        let Commands::Watch { url, socket, snapshot } = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(url.unwrap().as_str(), "http://localhost:3000/docs");
        assert_eq!(socket.unwrap().port(), Some(9000));
        assert!(snapshot.is_none());
    }

    #[test]
    fn test_hub_args() {
        let cli = Cli::parse_from(["livepatch", "hub", "--port", "4000", "--verbose"]);

        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Hub { interface: None, port: Some(4000) }
        ));
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(Cli::try_parse_from(["livepatch", "watch", "not a url"]).is_err());
    }
}
