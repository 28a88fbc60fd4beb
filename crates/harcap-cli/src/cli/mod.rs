//! CLI for the harcap capture manager.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use harcap_core::config::{self, HarcapConfig};

use commands::{
    run_check, run_clear_har, run_clear_run, run_config, run_import, run_report, run_start,
};

/// Top-level CLI for the harcap capture manager.
#[derive(Debug, Parser)]
#[command(name = "harcap")]
#[command(about = "harcap: HAR capture, JSON extraction and validation reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Watch the HAR directory and extract JSON responses until Ctrl-C.
    Start {
        /// Run name; defaults to the configured run name or the current local time.
        #[arg(long)]
        run: Option<String>,
    },

    /// One-shot import of every HAR file in the HAR directory, oldest first.
    Import {
        /// Run name; defaults to the configured run name or the current local time.
        #[arg(long)]
        run: Option<String>,
    },

    /// Build the deduplicated validation report for a run.
    Report {
        /// Run name; defaults to the configured run name or the current local time.
        #[arg(long)]
        run: Option<String>,
    },

    /// Inspect the HAR directory and configuration.
    Check,

    /// Delete a run directory and every artifact in it.
    ClearRun {
        /// Run name; defaults to the configured run name or the current local time.
        #[arg(long)]
        run: Option<String>,

        /// Confirm the deletion (required).
        #[arg(long)]
        yes: bool,
    },

    /// Delete all HAR files from the capture directory.
    ClearHar {
        /// Confirm the deletion (required).
        #[arg(long)]
        yes: bool,
    },

    /// Print the effective configuration and any problems with it.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Start { run } => {
                let run_dir = resolve_run_dir(&cfg, run.as_deref());
                run_start(cfg, run_dir).await?;
            }
            CliCommand::Import { run } => {
                run_import(&cfg, &resolve_run_dir(&cfg, run.as_deref()))?;
            }
            CliCommand::Report { run } => {
                run_report(&cfg, &resolve_run_dir(&cfg, run.as_deref()))?;
            }
            CliCommand::Check => run_check(&cfg)?,
            CliCommand::ClearRun { run, yes } => {
                run_clear_run(&cfg, &resolve_run_dir(&cfg, run.as_deref()), yes)?;
            }
            CliCommand::ClearHar { yes } => run_clear_har(&cfg, yes)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

/// Run directory name for this invocation: explicit `--run` flag, then
/// the configured run name, then a fresh local-time name. The env tag is
/// always appended.
fn resolve_run_dir(cfg: &HarcapConfig, flag: Option<&str>) -> String {
    let run_name = flag
        .map(str::to_string)
        .or_else(|| cfg.runtime.run_name.clone())
        .unwrap_or_else(|| config::default_run_name(chrono::Local::now()));
    config::run_dir_name(&run_name, &cfg.capture.env)
}
