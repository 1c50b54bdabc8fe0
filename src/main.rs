//! AML screening CLI
//!
//! Flags risky transactions in a CSV file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv > flagged.csv
//! cargo run -- --strategy sync --flagged-only transactions.csv > suspicious.csv
//! cargo run -- --threshold 5000 --window-hours 48 --high-risk Iran,Syria transactions.csv
//! cargo run -- --config rules.json --summary --summary-json summary.json -o flagged.csv transactions.csv
//! ```
//!
//! Flagged rows go to stdout (or `--output`); logs and the narrative summary
//! go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (bad arguments or configuration, unreadable or invalid input, etc.)

use aml_screening_engine::cli::{self, CliArgs, StrategyType};
use aml_screening_engine::io::{report, write_detection_csv};
use aml_screening_engine::strategy;
use aml_screening_engine::types::DetectionError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();
    init_tracing(&args);

    if let Err(e) = run(&args) {
        error!(error = %e, "screening failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(args: &CliArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<(), DetectionError> {
    let rules = args.to_rule_config()?;
    let batch = (args.strategy == StrategyType::Async).then(|| args.to_batch_config());
    let strategy = strategy::create_strategy(args.strategy, rules, args.on_invalid, batch);

    let result = strategy.detect(&args.input_file)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| DetectionError::Io {
                message: format!("Failed to create '{}': {}", path.display(), e),
            })?;
            write_detection_csv(&result, &mut BufWriter::new(file), args.row_filter())?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_detection_csv(&result, &mut stdout, args.row_filter())?;
            stdout.flush()?;
        }
    }

    if args.summary {
        eprint!("{}", report::narrative(result.summary()));
    }
    if let Some(path) = &args.summary_json {
        report::write_summary_json_file(result.summary(), path)?;
    }

    info!(
        input = %args.input_file.display(),
        suspicious = result.summary().suspicious_count,
        "screening complete"
    );
    Ok(())
}
