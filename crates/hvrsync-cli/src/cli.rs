//! Command-line arguments.
//!
//! Every knob can also be set through an `HVRSYNC_*` environment variable.
//! Values given on the command line override a `--config` file, which
//! overrides the built-in defaults.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hvrsync_sidecar::{SyncConfig, UpdateMode};
use std::path::PathBuf;

/// Keep Sony HDV metadata sidecars in sync with their `.IDX` index files.
#[derive(Debug, Clone, Parser)]
#[command(name = "hvrsync", version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "HVRSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Largest existing sidecar that will be read, in bytes
    #[arg(long, global = true, env = "HVRSYNC_MAX_SIDECAR_SIZE")]
    pub max_sidecar_size: Option<u64>,

    /// Sidecar file extension
    #[arg(long, global = true, env = "HVRSYNC_SIDECAR_EXTENSION")]
    pub sidecar_extension: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the technical metadata decoded from a clip's index as JSON
    Inspect {
        /// Logical clip path (`<root>/<clip>`) or a file in the clip folder
        path: PathBuf,
    },

    /// Print the current index digest of a clip
    Digest {
        /// Logical clip path (`<root>/<clip>`) or a file in the clip folder
        path: PathBuf,
    },

    /// Bring a clip's sidecar in line with its index
    Sync {
        /// Logical clip path (`<root>/<clip>`) or a file in the clip folder
        path: PathBuf,

        /// Rewrite an existing sidecar in place instead of replacing it
        #[arg(long, env = "HVRSYNC_FAST")]
        fast: bool,

        /// Write the sidecar even when no property changed
        #[arg(long)]
        force_write: bool,
    },
}

impl Cli {
    /// Build the sync configuration from the config file and overrides
    pub fn sync_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SyncConfig::default(),
        };

        if let Some(size) = self.max_sidecar_size {
            config = config.with_max_sidecar_size(size);
        }
        if let Some(extension) = &self.sidecar_extension {
            config = config.with_sidecar_extension(extension.clone());
        }
        if let Command::Sync { fast: true, .. } = self.command {
            config = config.with_update_mode(UpdateMode::Fast);
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_flags() {
        let cli = Cli::try_parse_from(["hvrsync", "sync", "/media/clip", "--fast", "--force-write"])
            .expect("parse");
        let Command::Sync {
            path,
            fast,
            force_write,
        } = &cli.command
        else {
            unreachable!("parsed a sync command");
        };
        assert_eq!(path, &PathBuf::from("/media/clip"));
        assert!(*fast);
        assert!(*force_write);

        let config = cli.sync_config().expect("config");
        assert_eq!(config.update_mode, UpdateMode::Fast);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "hvrsync",
            "inspect",
            "/media/clip",
            "--max-sidecar-size",
            "1024",
            "--sidecar-extension",
            "json",
        ])
        .expect("parse");

        let config = cli.sync_config().expect("config");
        assert_eq!(config.max_sidecar_size, 1024);
        assert_eq!(config.sidecar_extension, "json");
        assert_eq!(config.update_mode, UpdateMode::Safe);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::try_parse_from([
            "hvrsync",
            "digest",
            "/media/clip",
            "--sidecar-extension",
            "IDX",
        ])
        .expect("parse");
        assert!(cli.sync_config().is_err());
    }

    #[test]
    fn test_missing_command() {
        assert!(Cli::try_parse_from(["hvrsync"]).is_err());
    }
}
