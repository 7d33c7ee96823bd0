//! CLI for the pageflow chapter reader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pageflow_core::config;
use std::path::PathBuf;

use commands::{run_decode_next, run_read, run_simulate, ReadArgs, SimulateArgs};

/// Top-level CLI for the pageflow chapter reader.
#[derive(Debug, Parser)]
#[command(name = "pageflow")]
#[command(about = "pageflow: progressive page delivery for chapter readers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read a chapter over HTTP, scrolling through it headlessly.
    Read {
        /// Path to the chapter manifest (TOML).
        manifest: PathBuf,
        /// Use the constrained-network profile (lower concurrency, no next-chapter prefetch).
        #[arg(long)]
        constrained: bool,
        /// Milliseconds between scroll steps.
        #[arg(long, default_value = "400", value_name = "MS")]
        scroll_interval_ms: u64,
        /// Write delivered pages into this directory.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Read a chapter against a simulated network.
    Simulate {
        /// Path to the chapter manifest (TOML).
        manifest: PathBuf,
        /// Use the constrained-network profile.
        #[arg(long)]
        constrained: bool,
        /// Latency of every simulated fetch.
        #[arg(long, default_value = "120", value_name = "MS")]
        latency_ms: u64,
        /// Fail every N-th fetch (0 = never).
        #[arg(long, default_value = "0", value_name = "N")]
        fail_every: usize,
        /// Milliseconds between scroll steps.
        #[arg(long, default_value = "200", value_name = "MS")]
        scroll_interval_ms: u64,
    },

    /// Show the next-chapter prefetch queue an encoded candidate list yields.
    DecodeNext {
        /// JSON array of page locations.
        encoded: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Read {
                manifest,
                constrained,
                scroll_interval_ms,
                out,
            } => {
                run_read(
                    &cfg,
                    ReadArgs {
                        manifest,
                        constrained,
                        scroll_interval_ms,
                        out,
                    },
                )
                .await?
            }
            CliCommand::Simulate {
                manifest,
                constrained,
                latency_ms,
                fail_every,
                scroll_interval_ms,
            } => {
                run_simulate(
                    &cfg,
                    SimulateArgs {
                        manifest,
                        constrained,
                        latency_ms,
                        fail_every,
                        scroll_interval_ms,
                    },
                )
                .await?
            }
            CliCommand::DecodeNext { encoded } => run_decode_next(&cfg, &encoded)?,
        }

        Ok(())
    }
}
