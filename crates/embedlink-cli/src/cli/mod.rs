//! CLI for the embedlink resolver.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use embedlink_core::LanguageKey;

use commands::{ResolveOptions, run_embed, run_resolve};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "embedlink")]
#[command(about = "Resolve streaming-host embeds into direct media links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve an episode page into a direct link, optionally downloading it.
    Resolve {
        /// Episode page URL listing the available hosters.
        episode_url: String,

        /// Preferred language key (falls back to the first provider's smallest key).
        #[arg(long, short, default_value = "3", value_name = "N")]
        language: LanguageKey,

        /// Print the resolved link as JSON.
        #[arg(long)]
        json: bool,

        /// Download the link with yt-dlp after resolving.
        #[arg(long)]
        download: bool,

        /// Output file for --download (default: derived from the episode URL).
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Per-request timeout in seconds.
        #[arg(long, default_value = "30", value_name = "SECS")]
        timeout: u64,

        /// Retries of the whole resolution on transient failures.
        #[arg(long, default_value = "3", value_name = "N")]
        retries: u32,
    },

    /// Resolve a known provider's embed URL directly.
    Embed {
        /// Provider name as listed on episode pages (e.g. VOE, Doodstream).
        provider: String,

        /// Embed page URL on the provider's host.
        embed_url: String,

        /// Print the resolved link as JSON.
        #[arg(long)]
        json: bool,

        /// Per-request timeout in seconds.
        #[arg(long, default_value = "30", value_name = "SECS")]
        timeout: u64,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve {
                episode_url,
                language,
                json,
                download,
                output,
                timeout,
                retries,
            } => {
                let options = ResolveOptions {
                    language,
                    json,
                    download,
                    output,
                    timeout_secs: timeout,
                    retries,
                };
                run_resolve(&episode_url, &options).await?;
            }
            CliCommand::Embed {
                provider,
                embed_url,
                json,
                timeout,
            } => run_embed(&provider, &embed_url, json, timeout).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
