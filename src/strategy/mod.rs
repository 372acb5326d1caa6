//! Processing strategy module for operation script replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, engine calls and report output. This allows
//! different replay implementations (sequential, concurrent batch) to be
//! selected at runtime.

use crate::cli::{ReportKind, StrategyType};
use crate::core::{
    AccountNumberGenerator, Bank, InMemoryLedgerStore, LedgerConfig,
    RandomAccountNumberGenerator, SequentialAccountNumberGenerator,
};
use crate::io::csv_format::{write_accounts_report, write_history_report};
use crate::types::{OperationRecord, SessionError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub mod r#async;
pub mod batch_processor;
pub mod session;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use session::OperationSession;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads operations from a CSV script, replays them against a
/// fresh in-memory bank and writes the selected report.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the script at `input_path` and write the report to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the replay completed (individual operations may have failed)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// Rejected operations are logged and skipped; they never abort the replay.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Settings shared by every strategy
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    /// Engine retry and matching policy
    pub ledger: LedgerConfig,

    /// Report written once the script has been replayed
    pub report: ReportKind,

    /// Number accounts `B00000000001`, `B00000000002`, ... instead of randomly
    pub sequential_numbers: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            report: ReportKind::Accounts,
            sequential_numbers: false,
        }
    }
}

impl ReplayConfig {
    /// Fresh in-memory bank and session for one replay
    pub fn new_session(&self) -> Arc<OperationSession> {
        let generator: Arc<dyn AccountNumberGenerator> = if self.sequential_numbers {
            Arc::new(SequentialAccountNumberGenerator::new())
        } else {
            Arc::new(RandomAccountNumberGenerator::new())
        };
        let bank = Bank::new(
            Arc::new(InMemoryLedgerStore::new()),
            generator,
            self.ledger.clone(),
        );
        Arc::new(OperationSession::new(Arc::new(bank)))
    }

    /// Write the configured report for `session`
    pub fn write_report(
        &self,
        session: &OperationSession,
        output: &mut dyn Write,
    ) -> Result<(), String> {
        match self.report {
            ReportKind::Accounts => {
                let rows = session
                    .accounts_report()
                    .map_err(|e| format!("Failed to build accounts report: {}", e))?;
                write_accounts_report(&rows, output)
            }
            ReportKind::History => {
                let rows = session
                    .history_report()
                    .map_err(|e| format!("Failed to build history report: {}", e))?;
                write_history_report(&rows, output)
            }
        }
    }
}

/// Log a rejected operation
pub(crate) fn log_rejection(record: &OperationRecord, error: &SessionError) {
    warn!(
        operation = ?record.kind,
        customer = record.customer,
        %error,
        "Operation rejected"
    );
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch_config` - Optional configuration for async batch processing (ignored for sync)
/// * `replay_config` - Engine and report settings
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    replay_config: ReplayConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(replay_config)),
        StrategyType::Async => {
            let batch_config = batch_config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(batch_config, replay_config))
        }
    }
}
