//! ledgerline-report - Build reports from a directory of CSV ledgers.
//!
//! # Usage
//!
//! ```bash
//! ledgerline-report accounts
//! ledgerline-report --ledger-dir data --workers 8 yearly
//! ledgerline-report --sequential --output-dir reports all
//! ```
//!
//! # Reports
//!
//! - `accounts` - Balance per account, written to `accounts.csv`
//! - `yearly` - Net cash movement per year, written to `yearly.csv`
//! - `statement` - Income statement and balance sheet, written to `fs.csv`
//! - `all` - All three, in that order
//!
//! One `kind: status` line is printed per report run, e.g.
//! `yearly: finished in 0.04`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerline_core::ReportKind;
use ledgerline_engine::{EngineConfig, ExecutionMode, ReportEngine};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Build reports from a directory of CSV ledgers.
#[derive(Parser, Debug)]
#[command(name = "ledgerline-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The report to build
    #[command(subcommand)]
    report: Report,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory containing the ledger files
    #[arg(long, value_name = "DIR", global = true)]
    ledger_dir: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short, long, value_name = "N", global = true)]
    workers: Option<usize>,

    /// Run on the calling thread instead of the worker pool
    #[arg(long, global = true)]
    sequential: bool,

    /// Skip the first line of every ledger file
    #[arg(long, global = true)]
    has_header: bool,

    /// Let the remaining workers finish after one fails
    #[arg(long, global = true)]
    no_cancel: bool,

    /// JSON taxonomy for the financial statement
    #[arg(long, value_name = "FILE", global = true)]
    taxonomy: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Report {
    /// Balance per account
    Accounts,
    /// Net cash movement per year
    Yearly,
    /// Income statement and balance sheet
    Statement,
    /// All three reports
    All,
}

impl Report {
    fn kinds(self) -> &'static [ReportKind] {
        match self {
            Self::Accounts => &[ReportKind::Accounts],
            Self::Yearly => &[ReportKind::Yearly],
            Self::Statement => &[ReportKind::Statement],
            Self::All => &ReportKind::ALL,
        }
    }
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if let Some(dir) = &self.ledger_dir {
            config = config.with_ledger_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(path) = &self.taxonomy {
            config = config.with_taxonomy(path);
        }
        if self.has_header {
            config = config.with_header(true);
        }
        if self.no_cancel {
            config = config.with_cancel_on_failure(false);
        }
        Ok(config)
    }

    const fn mode(&self) -> ExecutionMode {
        if self.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("ledgerline={level}").parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run every requested report; `Ok(false)` if any of them failed.
fn run(args: &Args) -> Result<bool> {
    let config = args.engine_config()?;
    debug!(?config, "resolved configuration");
    let engine = ReportEngine::new(config).context("failed to start report engine")?;
    let mode = args.mode();

    let mut stdout = io::stdout().lock();
    let mut ok = true;

    // A failed report does not stop the ones after it.
    for &kind in args.report.kinds() {
        if let Err(e) = engine.run(kind, mode) {
            ok = false;
            eprintln!("error: {kind}: {e}");
        }
        writeln!(stdout, "{kind}: {}", engine.status(kind))?;
    }

    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["ledgerline-report", "accounts"]);
        let config = args.engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(args.mode(), ExecutionMode::Parallel);
        assert_eq!(args.report.kinds(), &[ReportKind::Accounts]);
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "ledgerline-report",
            "all",
            "--ledger-dir",
            "ledgers",
            "--output-dir",
            "reports",
            "--workers",
            "8",
            "--sequential",
            "--has-header",
            "--no-cancel",
        ]);
        let config = args.engine_config().unwrap();
        assert_eq!(config.ledger_dir, PathBuf::from("ledgers"));
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.workers, 8);
        assert!(config.has_header);
        assert!(!config.cancel_on_failure);
        assert_eq!(args.mode(), ExecutionMode::Sequential);
        assert_eq!(args.report.kinds().len(), 3);
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["ledgerline-report"]).is_err());
        assert!(Args::try_parse_from(["ledgerline-report", "balances"]).is_err());
    }
}
