use crate::core::config::{DEFAULT_MATCH_WINDOW_SECS, DEFAULT_MAX_RETRIES};
use crate::core::LedgerConfig;
use crate::strategy::{BatchConfig, ReplayConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay banking operation scripts against the retail ledger
#[derive(Parser, Debug)]
#[command(name = "retail-ledger")]
#[command(about = "Replay banking operation scripts against the retail ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the operation script CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Replay strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads replaying partitions (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Retries after an optimistic concurrency conflict
    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        env = "LEDGER_MAX_RETRIES",
        default_value_t = DEFAULT_MAX_RETRIES
    )]
    pub max_retries: u32,

    /// Time window for pairing transfer legs without a transfer group
    #[arg(
        long = "match-window-secs",
        value_name = "SECONDS",
        env = "LEDGER_MATCH_WINDOW_SECS",
        default_value_t = DEFAULT_MATCH_WINDOW_SECS
    )]
    pub match_window_secs: u64,

    /// Report written to stdout
    #[arg(long = "report", value_name = "REPORT", default_value = "accounts")]
    pub report: ReportKind,

    /// Assign account numbers sequentially for reproducible output
    #[arg(long = "sequential-numbers")]
    pub sequential_numbers: bool,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// One line per customer with account number and balance
    Accounts,
    /// Every transaction with its counterparty
    History,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values fall back to the
    /// defaults with a warning.
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

    /// Create the engine and report settings from CLI arguments
    pub fn to_replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            ledger: LedgerConfig::new(self.max_retries, self.match_window_secs),
            report: self.report,
            sequential_numbers: self.sequential_numbers,
        }
    }
}
