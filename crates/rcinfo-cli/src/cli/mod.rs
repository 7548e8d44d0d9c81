//! CLI for rcinfo.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rcinfo_core::config;
use rcinfo_core::shape::{Layout, MaskMode};
use std::path::PathBuf;

use commands::{run_bot, run_lookup, run_quota, run_serve, LookupOptions};

/// Top-level CLI for rcinfo.
#[derive(Debug, Parser)]
#[command(name = "rcinfo")]
#[command(about = "rcinfo: vehicle registration lookup web form and chat bot", long_about = None)]
pub struct Cli {
    /// Quota file to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub quota_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the web search form.
    Serve {
        /// Listen address (default from config, e.g. 127.0.0.1:8080).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Run the chat bot (long polling). Needs TELEGRAM_BOT_TOKEN.
    Bot,

    /// Look up one registration number and print the details.
    Lookup {
        /// Registration number, e.g. JK03N1234.
        regno: String,

        /// Field table: chat (compact) or card (full).
        #[arg(long, default_value = "chat")]
        layout: Layout,

        /// Masked engine numbers: suppress or substitute (default depends on layout).
        #[arg(long)]
        mask: Option<MaskMode>,

        /// Print the shaped sections as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change per-user search quotas.
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuotaAction {
    /// Show a user's counters.
    Show {
        /// Chat user id.
        user: String,
    },

    /// Grant premium searches to a user (replaces their counters).
    Grant {
        /// Chat user id.
        user: String,
        /// Searches to grant (default from config).
        #[arg(long, value_name = "N")]
        searches: Option<i64>,
    },

    /// Revoke premium from a user.
    Revoke {
        /// Chat user id.
        user: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(path) = cli.quota_file {
            cfg.quota_path = Some(path);
        }
        tracing::debug!(
            quota_path = ?cfg.quota_path,
            api_url = %cfg.upstream.api_url,
            "loaded config"
        );

        match cli.command {
            CliCommand::Serve { bind } => run_serve(&cfg, bind.as_deref()).await?,
            CliCommand::Bot => run_bot(&cfg).await?,
            CliCommand::Lookup {
                regno,
                layout,
                mask,
                json,
            } => {
                let opts = LookupOptions { layout, mask, json };
                run_lookup(&cfg, &regno, opts).await?;
            }
            CliCommand::Quota { action } => run_quota(&cfg, action)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
