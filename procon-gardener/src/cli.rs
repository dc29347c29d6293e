//! Command-line surface of procon-gardener.
//!
//! Parsing and glue only: config file IO is in [`crate::load_config`], the
//! archive pipeline is [`procon_gardener_core::synchronise`].
//!
//! [`run`] never reports failure to the caller. A config that cannot be read
//! or is incomplete is logged and the run ends there, so the process exit
//! code stays 0.
use crate::load_config::{edit_config, init_config, load_config, resolve_config_path};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use procon_gardener_core::atcoder::AtCoderClient;
use procon_gardener_core::commit::GitCommitter;
use procon_gardener_core::config::Config;
use procon_gardener_core::contract::Pacing;
use procon_gardener_core::synchronise::{synchronise, ArchiveConfig, ArchiveReport};
use std::path::PathBuf;

/// Archive your accepted AtCoder submissions into a git repository.
#[derive(Parser, Debug)]
#[clap(
    name = "procon-gardener",
    version,
    about = "Archive your accepted AtCoder submissions into a git repository"
)]
pub struct Cli {
    /// Config file to use instead of ~/.procon-gardener/config.json
    #[clap(long, global = true, env = "PROCON_GARDENER_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive new accepted submissions and commit each one
    #[clap(visible_alias = "a")]
    Archive {
        /// Contest to scan (repeatable); replaces the configured list
        #[clap(long = "contest", value_name = "CONTEST")]
        contests: Vec<String>,
    },
    /// Write a blank config file
    #[clap(visible_alias = "i")]
    Init {
        /// Overwrite an existing config file
        #[clap(long)]
        force: bool,
    },
    /// Open the config file in $EDITOR, creating it first if needed
    #[clap(visible_alias = "e")]
    Edit,
}

/// Replaces the configured contest list when `--contest` was given.
pub fn with_contest_override(mut config: Config, contests: Vec<String>) -> Config {
    if !contests.is_empty() {
        config.atcoder.contests = contests;
    }
    config
}

/// Builds the pipeline input from a loaded config.
pub fn archive_config(config: &Config) -> ArchiveConfig {
    ArchiveConfig {
        repository_path: config.atcoder.repository_path.clone(),
        user_id: config.atcoder.user_id.clone(),
        contests: config.atcoder.contests.clone(),
        pacing: Pacing::default(),
    }
}

async fn archive(config_path: PathBuf, contests: Vec<String>) -> Result<ArchiveReport> {
    let config = with_contest_override(load_config(&config_path)?, contests);
    config
        .validate()
        .map_err(|e| anyhow!("Invalid config {}: {e}", config_path.display()))?;

    let judge = AtCoderClient::new(&config.atcoder.base_url)?;
    let committer = GitCommitter::new(
        config.atcoder.repository_path.clone(),
        config.atcoder.user_email.clone(),
    );
    if !committer.is_repository() {
        tracing::warn!(
            root = %config.atcoder.repository_path.display(),
            "Archive root is not a git repository, files will be written without commits"
        );
    }

    Ok(synchronise(&archive_config(&config), &judge, &committer).await)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config)?;
    match cli.command {
        Commands::Archive { contests } => {
            tracing::info!(command = "archive", "Starting archive run");
            let report = archive(config_path, contests).await?;
            tracing::info!(
                command = "archive",
                discovered = report.discovered,
                already_archived = report.already_archived,
                archived = report.archived.len(),
                committed = report.committed,
                failed = report.failed,
                "Archive completed."
            );
        }
        Commands::Init { force } => {
            if init_config(&config_path, force)? {
                tracing::info!(command = "init", config_path = ?config_path, "Config initialised");
            }
        }
        Commands::Edit => {
            edit_config(&config_path)?;
        }
    }
    Ok(())
}

/// Async entrypoint shared by `main()` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    if let Err(e) = dispatch(cli).await {
        tracing::error!(error = %e, "procon-gardener stopped");
    }
    Ok(())
}
