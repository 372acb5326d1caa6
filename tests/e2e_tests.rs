//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! test fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays all operations against a fresh ledger with sequential account numbers
//! 3. Generates the requested report
//! 4. Compares actual output with expected_accounts.csv or expected_history.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios (registration, openings, deposits, withdrawals, transfers)
//! - Rejected operations (validation failures, insufficient funds, unknown targets)
//! - Transfer history with counterparty labels
//!
//! Fixtures whose outcome does not depend on cross-customer ordering run with
//! both strategies. Fixtures where one customer's operation depends on funds
//! moved by another customer run with the sequential strategy only.

#[cfg(test)]
mod tests {
    use retail_ledger::cli::{ReportKind, StrategyType};
    use retail_ledger::strategy::{create_strategy, ReplayConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Run a fixture and compare the report with the expected file
    ///
    /// # Arguments
    ///
    /// * `fixture_name` - Name of the fixture directory (e.g., "happy_path")
    /// * `strategy_type` - Replay strategy to use (Sync or Async)
    /// * `report` - Report to generate
    ///
    /// # Panics
    ///
    /// Panics if fixture files cannot be read or the output doesn't match.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, report: ReportKind) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = match report {
            ReportKind::Accounts => format!("{}/expected_accounts.csv", fixture_dir),
            ReportKind::History => format!("{}/expected_history.csv", fixture_dir),
        };

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let replay_config = ReplayConfig {
            report,
            sequential_numbers: true,
            ..ReplayConfig::default()
        };
        let strategy = create_strategy(strategy_type.clone(), None, replay_config);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?}, report: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, report, actual_output, expected_output
        );
    }

    /// Accounts report for order-independent fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("rejected_operations")]
    fn test_accounts_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy, ReportKind::Accounts);
    }

    /// Fixtures that depend on script order across customers
    #[rstest]
    #[case("transfer_history", ReportKind::Accounts)]
    #[case("transfer_history", ReportKind::History)]
    fn test_sequential_fixtures(#[case] fixture: &str, #[case] report: ReportKind) {
        run_test_fixture(fixture, StrategyType::Sync, report);
    }

    #[test]
    fn test_missing_input_file_is_fatal() {
        let strategy = create_strategy(StrategyType::Sync, None, ReplayConfig::default());
        let mut output = Vec::new();

        let result = strategy.process(Path::new("tests/fixtures/does_not_exist.csv"), &mut output);

        assert!(result.is_err());
        assert!(output.is_empty());
    }
}
