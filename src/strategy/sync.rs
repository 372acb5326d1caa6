//! Synchronous processing strategy
//!
//! This module provides a sequential implementation of the ProcessingStrategy
//! trait. Every operation is replayed in script order on the calling thread,
//! which makes the resulting reports fully deterministic.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Operation replay to `OperationSession` (key mapping + engine calls)
//! - Report output to `ReplayConfig::write_report` (format handling)

use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_rejection, ProcessingStrategy, ReplayConfig};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use retail_ledger::strategy::{ProcessingStrategy, ReplayConfig, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ReplayConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: ReplayConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay the script sequentially and write the report
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Invalid rows and rejected operations are logged and skipped.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let session = self.config.new_session();
        let reader = SyncReader::new(input_path)?;

        let mut applied = 0usize;
        let mut rejected = 0usize;

        for result in reader {
            match result {
                Ok(record) => match session.apply(&record) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        rejected += 1;
                        log_rejection(&record, &e);
                    }
                },
                Err(e) => {
                    rejected += 1;
                    warn!(error = %e, "Skipping invalid row");
                }
            }
        }

        info!(applied, rejected, "Replay finished");
        self.config.write_report(&session, output)
    }
}
