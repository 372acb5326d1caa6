//! Batch processing with customer-based partitioning for concurrent replay
//!
//! This module provides the `BatchProcessor` struct, which replays batches of
//! operation records concurrently while keeping each customer's operations in
//! script order.
//!
//! # Design
//!
//! Setup operations (register, open) create the customers and accounts that
//! later rows refer to, so they act as barriers:
//!
//! ```text
//! batch:  dep dep xfer │ open │ wd dep xfer xfer
//!         └─ segment ─┘ inline └──── segment ────┘
//! ```
//!
//! Every segment of money movements between two barriers is partitioned by
//! customer key; partitions run as separate tasks on tokio's blocking pool
//! and each partition replays its operations sequentially. Barriers run on their own, after the
//! previous segment completed.
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares the `OperationSession` behind an
//! `Arc`. Consistency between concurrent partitions touching the same account
//! (a transfer and the recipient's withdrawal) comes from the engine's
//! optimistic concurrency, not from the partitioning.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::strategy::session::OperationSession;
use crate::types::{CustomerKey, OperationRecord, SessionError};

/// Result of replaying a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was replayed
    pub record: OperationRecord,

    /// The outcome of replaying it
    pub result: Result<(), SessionError>,
}

/// Batch processor with customer-based partitioning
#[derive(Clone)]
pub struct BatchProcessor {
    session: Arc<OperationSession>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor over a shared session
    pub fn new(session: Arc<OperationSession>) -> Self {
        Self { session }
    }

    /// Partition money movements by customer key
    ///
    /// # Returns
    ///
    /// A HashMap from customer key to that customer's operations, in their
    /// original order. Each operation appears in exactly one partition.
    pub fn partition_by_customer(
        &self,
        operations: Vec<OperationRecord>,
    ) -> HashMap<CustomerKey, Vec<OperationRecord>> {
        let mut partitions: HashMap<CustomerKey, Vec<OperationRecord>> = HashMap::new();

        for record in operations {
            partitions.entry(record.customer).or_default().push(record);
        }

        partitions
    }

    /// Replay one customer's operations sequentially
    ///
    /// Every operation is attempted; failures are captured in the results.
    /// Engine calls block on the store's commit gate and retry loop, so this is
    /// run on tokio's blocking pool.
    pub fn process_customer_operations(
        &self,
        operations: Vec<OperationRecord>,
    ) -> Vec<ProcessingResult> {
        operations
            .into_iter()
            .map(|record| {
                let result = self.session.apply(&record);
                ProcessingResult { record, result }
            })
            .collect()
    }

    /// Replay a batch of operations
    ///
    /// 1. Split the batch at setup operations
    /// 2. Run each segment of money movements partitioned by customer, concurrently
    /// 3. Run each setup operation once the preceding segment completed
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per operation whose task completed. Results of
    /// different customers within a segment may be interleaved in any order.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        let mut segment = Vec::new();

        for record in batch {
            if record.kind.is_setup() {
                let pending = std::mem::take(&mut segment);
                results.extend(self.process_segment(pending).await);

                let result = self.session.apply(&record);
                results.push(ProcessingResult { record, result });
            } else {
                segment.push(record);
            }
        }
        results.extend(self.process_segment(segment).await);

        results
    }

    /// Replay money movements with one task per customer
    async fn process_segment(&self, segment: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        if segment.is_empty() {
            return Vec::new();
        }

        let mut tasks = Vec::new();
        for (_customer, operations) in self.partition_by_customer(segment) {
            let processor = self.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                processor.process_customer_operations(operations)
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(customer_results) => results.extend(customer_results),
                Err(e) => error!(error = %e, "Replay task failed"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bank, InMemoryLedgerStore, LedgerConfig, SequentialAccountNumberGenerator};
    use crate::types::{OperationKind, TransferTarget};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn processor() -> BatchProcessor {
        let bank = Bank::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(SequentialAccountNumberGenerator::new()),
            LedgerConfig::default(),
        );
        BatchProcessor::new(Arc::new(OperationSession::new(Arc::new(bank))))
    }

    fn op(kind: OperationKind, customer: CustomerKey, amount: Option<Decimal>) -> OperationRecord {
        OperationRecord {
            kind,
            customer,
            amount,
            target: None,
            name: Some(format!("Customer {}", customer)),
            email: Some(format!("c{}@example.com", customer)),
            phone: None,
        }
    }

    fn setup(customers: &[CustomerKey]) -> Vec<OperationRecord> {
        customers
            .iter()
            .flat_map(|&key| {
                vec![
                    op(OperationKind::Register, key, None),
                    op(OperationKind::Open, key, Some(dec!(100.00))),
                ]
            })
            .collect()
    }

    fn balances(processor: &BatchProcessor) -> Vec<Option<Decimal>> {
        processor
            .session
            .accounts_report()
            .unwrap()
            .into_iter()
            .map(|row| row.balance)
            .collect()
    }

    #[test]
    fn test_partition_by_customer_keeps_order() {
        let processor = processor();
        let batch = vec![
            op(OperationKind::Deposit, 1, Some(dec!(1))),
            op(OperationKind::Deposit, 2, Some(dec!(2))),
            op(OperationKind::Withdraw, 1, Some(dec!(3))),
        ];

        let partitions = processor.partition_by_customer(batch);

        assert_eq!(partitions.len(), 2);
        let first = &partitions[&1];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, OperationKind::Deposit);
        assert_eq!(first[1].kind, OperationKind::Withdraw);
        assert_eq!(partitions[&2][0].amount, Some(dec!(2)));
    }

    #[test]
    fn test_partition_empty_batch() {
        assert!(processor().partition_by_customer(vec![]).is_empty());
    }

    #[test]
    fn test_customer_operations_replay_in_order() {
        let processor = processor();
        processor.process_customer_operations(setup(&[1]));

        let results = processor.process_customer_operations(vec![
            op(OperationKind::Withdraw, 1, Some(dec!(150.00))),
            op(OperationKind::Deposit, 1, Some(dec!(50.00))),
            op(OperationKind::Withdraw, 1, Some(dec!(150.00))),
        ]);

        let outcomes: Vec<bool> = results.iter().map(|r| r.result.is_ok()).collect();
        assert_eq!(outcomes, vec![false, true, true]);
        assert_eq!(balances(&processor), vec![Some(dec!(0.00))]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_setup_runs_before_later_operations() {
        let processor = processor();
        let mut batch = setup(&[1, 2]);
        batch.push(op(OperationKind::Deposit, 1, Some(dec!(5.00))));
        batch.push(op(OperationKind::Register, 3, None));
        batch.push(op(OperationKind::Open, 3, Some(dec!(10.00))));
        batch.push(op(OperationKind::Deposit, 3, Some(dec!(1.00))));

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.result.is_ok()));
        assert_eq!(
            balances(&processor),
            vec![Some(dec!(105.00)), Some(dec!(100.00)), Some(dec!(11.00))]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_partitions_conserve_money() {
        let processor = processor();
        processor.process_batch(setup(&[1, 2, 3, 4])).await;

        let mut batch = Vec::new();
        for round in 0..20u32 {
            for from in 1..=4u32 {
                let to = from % 4 + 1;
                batch.push(OperationRecord {
                    target: Some(TransferTarget::Customer(to)),
                    ..op(OperationKind::Transfer, from, Some(Decimal::from(round % 3 + 1)))
                });
            }
        }

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 80);
        let total: Decimal = balances(&processor).into_iter().flatten().sum();
        assert_eq!(total, dec!(400.00));
        assert!(processor.session.bank().audit_balances().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_captured() {
        let processor = processor();
        let mut batch = setup(&[1]);
        batch.push(op(OperationKind::Withdraw, 1, Some(dec!(500.00))));
        batch.push(op(OperationKind::Deposit, 9, Some(dec!(1.00))));

        let results = processor.process_batch(batch).await;

        let failures: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(failures.len(), 2);
        assert_eq!(balances(&processor), vec![Some(dec!(100.00))]);
    }
}
