//! Asynchronous batch processing strategy
//!
//! This module provides a concurrent implementation of the ProcessingStrategy
//! trait. It replays the script in batches on a multi-threaded tokio runtime,
//! partitioning money movements by customer.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (setup barriers + customer partitioning)
//!     └── OperationSession (key mapping)
//!         └── Bank (thread-safe engine over InMemoryLedgerStore)
//! ```
//!
//! # Ordering
//!
//! - Batches are replayed one after another
//! - Within a batch, setup rows are barriers and money movements of different
//!   customers run in parallel
//! - Each customer's own operations keep their script order
//!
//! Operations of different customers that touch the same account may
//! interleave in any order, so balances that depend on that order can differ
//! from a sequential replay.

use crate::io::async_reader::AsyncReader;
use crate::strategy::batch_processor::BatchProcessor;
use crate::strategy::{log_rejection, ProcessingStrategy, ReplayConfig};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Configuration for batch processing
///
/// Controls how many operations are read per batch and the number of worker
/// threads replaying partitions.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    batch_config: BatchConfig,
    replay_config: ReplayConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `batch_config` - Batch size and worker thread count
    /// * `replay_config` - Engine and report settings
    pub fn new(batch_config: BatchConfig, replay_config: ReplayConfig) -> Self {
        Self {
            batch_config,
            replay_config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay the script in concurrent batches and write the report
    ///
    /// 1. Creates a multi-threaded tokio runtime
    /// 2. Reads operations in batches from CSV using AsyncReader
    /// 3. Replays each batch through the BatchProcessor, waiting for it to finish
    /// 4. Writes the configured report
    ///
    /// Fatal errors (file not found, runtime errors, output errors) are returned
    /// immediately. Rejected operations are logged and replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch_config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let session = self.replay_config.new_session();
        let processor = BatchProcessor::new(session.clone());

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut rejected = 0usize;

            loop {
                let batch = reader.read_batch(self.batch_config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Wait for the whole batch so later batches see its effects
                for outcome in processor.process_batch(batch).await {
                    match &outcome.result {
                        Ok(()) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            log_rejection(&outcome.record, e);
                        }
                    }
                }
            }

            info!(applied, rejected, "Replay finished");
            Ok::<(), String>(())
        })?;

        self.replay_config.write_report(&session, output)
    }
}
