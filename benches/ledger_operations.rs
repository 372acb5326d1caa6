//! Benchmark suite for the ledger engine and replay strategies
//!
//! This benchmark measures the engine operations and compares the synchronous
//! and asynchronous replay strategies using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! Operation scripts are generated into temporary files, with a mix of:
//! - Registrations and account openings
//! - Deposits and withdrawals
//! - Transfers between customers

use retail_ledger::cli::StrategyType;
use retail_ledger::core::{Bank, LedgerConfig};
use retail_ledger::strategy::{create_strategy, BatchConfig, ReplayConfig};
use retail_ledger::types::{Account, NewCustomer};
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

fn main() {
    divan::main();
}

fn bank_with_accounts(count: usize) -> (Bank, Vec<Account>) {
    let bank = Bank::in_memory(LedgerConfig::default());
    let accounts = (0..count)
        .map(|i| {
            let customer = bank
                .register_customer(NewCustomer::new(
                    format!("Customer {}", i),
                    format!("customer{}@example.com", i),
                    None,
                ))
                .expect("Registration failed");
            bank.open_account(customer.id, Decimal::new(1_000_000, 2))
                .expect("Opening failed")
                .account
        })
        .collect();
    (bank, accounts)
}

/// Script with `customers` customers and `operations` money movements
fn script(customers: usize, operations: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "op,customer,amount,target,name,email,phone").expect("Write failed");
    for c in 1..=customers {
        writeln!(file, "register,{c},,,Customer {c},customer{c}@example.com,")
            .expect("Write failed");
        writeln!(file, "open,{c},1000.00").expect("Write failed");
    }
    for i in 0..operations {
        let customer = i % customers + 1;
        let line = match i % 3 {
            0 => format!("deposit,{customer},12.34"),
            1 => format!("withdraw,{customer},5.00"),
            _ => format!("transfer,{customer},1.50,{}", customer % customers + 1),
        };
        writeln!(file, "{}", line).expect("Write failed");
    }
    file.flush().expect("Flush failed");
    file
}

#[divan::bench(args = [100, 1_000])]
fn deposits(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| bank_with_accounts(1))
        .bench_values(|(bank, accounts)| {
            for _ in 0..count {
                bank.deposit(accounts[0].id, Decimal::new(1_00, 2))
                    .expect("Deposit failed");
            }
        });
}

#[divan::bench(args = [100, 1_000])]
fn transfers(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| bank_with_accounts(10))
        .bench_values(|(bank, accounts)| {
            for i in 0..count {
                let source = &accounts[i % accounts.len()];
                let destination = &accounts[(i + 1) % accounts.len()];
                bank.transfer(source.id, destination.number.as_str(), Decimal::new(1_00, 2))
                    .expect("Transfer failed");
            }
        });
}

/// Annotated history of one account with many transfer legs
#[divan::bench(args = [100, 1_000])]
fn history_reconciliation(bencher: divan::Bencher, transfers: usize) {
    let (bank, accounts) = bank_with_accounts(2);
    for i in 0..transfers {
        let (source, destination) = if i % 2 == 0 {
            (&accounts[0], &accounts[1])
        } else {
            (&accounts[1], &accounts[0])
        };
        bank.transfer(source.id, destination.number.as_str(), Decimal::new(1_00, 2))
            .expect("Transfer failed");
    }

    bencher.bench(|| bank.account_history(accounts[0].id).expect("History failed"));
}

#[divan::bench(args = [1_000, 10_000])]
fn sync_strategy(bencher: divan::Bencher, operations: usize) {
    let file = script(50, operations);
    let strategy = create_strategy(StrategyType::Sync, None, ReplayConfig::default());

    bencher.bench(|| {
        let mut output = Vec::new();
        strategy
            .process(file.path(), &mut output)
            .expect("Processing failed");
    });
}

#[divan::bench(args = [1_000, 10_000])]
fn async_strategy(bencher: divan::Bencher, operations: usize) {
    let file = script(50, operations);
    let strategy = create_strategy(
        StrategyType::Async,
        Some(BatchConfig::default()),
        ReplayConfig::default(),
    );

    bencher.bench(|| {
        let mut output = Vec::new();
        strategy
            .process(file.path(), &mut output)
            .expect("Processing failed");
    });
}
