use crate::io::csv_format::{InvalidRowPolicy, RowFilter};
use crate::strategy::BatchConfig;
use crate::types::{DetectionError, RuleConfig, RuleOverrides};
use clap::{ArgAction, Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// Screen transactions for anti-money-laundering risk indicators
#[derive(Parser, Debug)]
#[command(name = "aml-screen")]
#[command(
    about = "Flag large, high-risk-country and structuring transactions in a CSV file",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file path containing transaction records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for parallel detection"
    )]
    pub strategy: StrategyType,

    /// Rows read per chunk (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of rows read per chunk (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of detection worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(
        long = "threshold",
        value_name = "AMOUNT",
        value_parser = parse_threshold,
        help = "Large-transaction threshold; also bounds structuring window sums (default: 10000)"
    )]
    pub threshold: Option<Decimal>,

    #[arg(
        long = "window-hours",
        value_name = "HOURS",
        help = "Structuring window length in hours (default: 24)"
    )]
    pub window_hours: Option<u32>,

    #[arg(
        long = "high-risk",
        value_name = "COUNTRIES",
        value_delimiter = ',',
        help = "Comma-separated high-risk countries, replacing the defaults"
    )]
    pub high_risk: Option<Vec<String>>,

    #[arg(
        long = "config",
        value_name = "PATH",
        help = "JSON rule configuration; command-line flags take precedence"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "on-invalid",
        value_name = "POLICY",
        default_value = "reject",
        help = "What to do with invalid rows: 'reject' fails the run, 'skip' drops the row"
    )]
    pub on_invalid: InvalidRowPolicy,

    #[arg(
        long = "output",
        short = 'o',
        value_name = "PATH",
        help = "Write flagged rows here instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "flagged-only", help = "Only write rows flagged as suspicious")]
    pub flagged_only: bool,

    #[arg(long = "summary", help = "Print a narrative summary to stderr")]
    pub summary: bool,

    #[arg(
        long = "summary-json",
        value_name = "PATH",
        help = "Write summary statistics as JSON"
    )]
    pub summary_json: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug); RUST_LOG overrides"
    )]
    pub verbose: u8,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

fn parse_threshold(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|e| format!("invalid amount '{}': {}", raw, e))
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Resolve rule settings: defaults, then `--config`, then flags
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file is unreadable or the merged
    /// settings are invalid.
    pub fn to_rule_config(&self) -> Result<RuleConfig, DetectionError> {
        let base = match &self.config {
            Some(path) => RuleConfig::from_json_file(path)?,
            None => RuleConfig::default(),
        };

        base.with_overrides(RuleOverrides {
            large_tx_threshold: self.threshold,
            structuring_window_hours: self.window_hours,
            high_risk_countries: self.high_risk.clone(),
        })
    }

    pub fn row_filter(&self) -> RowFilter {
        if self.flagged_only {
            RowFilter::SuspiciousOnly
        } else {
            RowFilter::All
        }
    }

    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
