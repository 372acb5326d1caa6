//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over operation records from a CSV script.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV records sequentially,
//! delegating parsing and conversion to the csv_format module. Records are
//! processed one at a time without loading the entire file into memory.
//!
//! ```no_run
//! use retail_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Replaying operation: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_csv_record, OperationCsvRecord};
use crate::types::OperationRecord;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over operation records.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, String>;

    /// Get the next operation record from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(OperationRecord))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<OperationCsvRecord>();
        let parsed = deserializer.next()?;
        self.line_num += 1;

        // +1 for the header line
        let line = self.line_num + 1;
        Some(match parsed {
            Ok(csv_record) => {
                convert_csv_record(csv_record).map_err(|e| format!("Line {}: {}", line, e))
            }
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperationKind, TransferTarget};
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,customer,amount,target,name,email,phone\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_reader_iterates_script() {
        let csv_content = format!(
            "{}register,1,,,Alice,alice@example.com,\nopen,1,100.00\ntransfer,1,25,2\n",
            HEADER
        );
        let file = create_temp_csv(&csv_content);

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 3);
        let register = records[0].as_ref().unwrap();
        assert_eq!(register.kind, OperationKind::Register);
        assert_eq!(register.name.as_deref(), Some("Alice"));
        assert_eq!(register.phone, None);

        let open = records[1].as_ref().unwrap();
        assert_eq!(open.kind, OperationKind::Open);
        assert_eq!(open.amount, Some(dec!(100.00)));

        let transfer = records[2].as_ref().unwrap();
        assert_eq!(transfer.target, Some(TransferTarget::Customer(2)));
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let csv_content = format!(
            "{}deposit,1,100.0\ndeposit,2,invalid\ndeposit,3,50.0\n",
            HEADER
        );
        let file = create_temp_csv(&csv_content);

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[2].is_ok());
        let error = records[1].as_ref().unwrap_err();
        assert!(error.contains("Line 3")); // Line 3 because of header
        assert!(error.contains("Invalid amount"));
    }

    #[test]
    fn test_sync_reader_reports_unparseable_customer() {
        let csv_content = format!("{}deposit,abc,1.00\n", HEADER);
        let file = create_temp_csv(&csv_content);

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 1);
        assert!(records[0].as_ref().unwrap_err().contains("CSV parse error"));
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let csv_content = format!("{}  withdraw  ,  1  ,  10.50  \n", HEADER);
        let file = create_temp_csv(&csv_content);

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, OperationKind::Withdraw);
        assert_eq!(records[0].amount, Some(dec!(10.50)));
    }

    #[test]
    fn test_sync_reader_empty_file_after_header() {
        let file = create_temp_csv(HEADER);
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
