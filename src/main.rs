//! Retail Ledger CLI
//!
//! Command-line interface for replaying banking operation scripts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --strategy sync --report history operations.csv > history.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv
//! cargo run -- --sequential-numbers --max-retries 10 operations.csv
//! ```
//!
//! The program replays the operations of the input CSV against a fresh
//! in-memory ledger using the selected strategy and writes the selected
//! report to stdout. Logs go to stderr (`RUST_LOG` controls verbosity).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use retail_ledger::cli;
use retail_ledger::strategy;
use retail_ledger::telemetry;
use std::process;
use tracing::error;

fn main() {
    telemetry::init();

    let args = cli::parse_args();

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), batch_config, args.to_replay_config())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "Replay failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
