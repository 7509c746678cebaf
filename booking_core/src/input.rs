//! Booking feed reader.
//!
//! The feed is a headed CSV with at least the columns `name`, `email`,
//! `phone`, `service`, `provider` and `start`. Extra columns are ignored,
//! which lets a rejects file be fed back in after correction.

use crate::{Error, ImportRow, Result};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Columns every feed must carry
pub const REQUIRED_COLUMNS: [&str; 6] = ["name", "email", "phone", "service", "provider", "start"];

/// Read the whole feed into memory
pub fn read_rows(path: &Path) -> Result<Vec<ImportRow>> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Input(format!("cannot open input feed {:?}: {}", path, e))
    })?;
    let rows = read_rows_from(file)?;
    tracing::info!("Read {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Read a feed from any reader
pub fn read_rows_from<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<_> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(Error::Input(format!(
            "input feed is missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<ImportRow>().enumerate() {
        let row = record.map_err(|e| Error::Input(format!("CSV row {}: {}", i + 1, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_in_order() {
        let data = "\
name,email,phone,service,provider,start
Alice,a@x.com,555,Haircut,Dr. Smith,2024-01-01 10:00:00
Bob,b@x.com,,Massage,Dr. Jones,2024-01-02 11:30:00
";
        let rows = read_rows_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].phone.as_deref(), Some("555"));
        assert_eq!(rows[0].provider, "Dr. Smith");
        assert_eq!(rows[1].phone, None);
        assert_eq!(rows[1].start, "2024-01-02 11:30:00");
    }

    #[test]
    fn test_column_order_and_extra_columns_do_not_matter() {
        let data = "\
row,start,provider,service,phone,email,name,reason
4,2024-01-01 10:00:00,Dr. Smith,Haircut,555,a@x.com,Alice,service not matched: Haircut
";
        let rows = read_rows_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@x.com");
        assert_eq!(rows[0].service, "Haircut");
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let data = "name,email,service,provider\nAlice,a@x.com,Haircut,Dr. Smith\n";
        match read_rows_from(data.as_bytes()) {
            Err(Error::Input(message)) => {
                assert!(message.contains("phone"));
                assert!(message.contains("start"));
            }
            other => panic!("expected input error, got {:?}", other),
        }
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let data = "name,email,phone,service,provider,start\nAl, a@x.com,1,Cut ,P,s\n";
        let rows = read_rows_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].email, " a@x.com");
        assert_eq!(rows[0].service, "Cut ");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = read_rows(&temp_dir.path().join("nope.csv"));
        assert!(matches!(result, Err(Error::Input(_))));
    }

    #[test]
    fn test_header_only_feed_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bookings.csv");
        std::fs::write(&path, "name,email,phone,service,provider,start\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert!(rows.is_empty());
    }
}
