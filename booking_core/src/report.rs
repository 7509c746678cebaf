//! Run report and rejects file.
//!
//! Every input row ends up as exactly one [`RowRecord`]. Rows that did not
//! produce a booking can be written to a rejects CSV that keeps the input
//! columns, so the file can be corrected and fed straight back in.

use crate::{Error, ImportRow, Result, RowOutcome};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Outcome of one input row
#[derive(Clone, Debug)]
pub struct RowRecord {
    /// 1-based position in the feed
    pub row_number: usize,
    pub row: ImportRow,
    pub outcome: RowOutcome,
}

/// Aggregated result of an import run
#[derive(Clone, Debug)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<RowRecord>,
    pub clients_created: usize,
}

impl ImportReport {
    pub fn new(run_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            started_at: now,
            finished_at: now,
            records: Vec::new(),
            clients_created: 0,
        }
    }

    pub fn processed(&self) -> usize {
        self.records.len()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Created(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed(_)))
    }

    /// Rows that did not produce a booking
    pub fn rejected(&self) -> impl Iterator<Item = &RowRecord> {
        self.records.iter().filter(|r| !r.outcome.is_created())
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// One-line summary for the operator
    pub fn summary(&self) -> String {
        format!(
            "{} rows processed: {} booked, {} skipped, {} failed, {} new clients ({}s)",
            self.processed(),
            self.created(),
            self.skipped(),
            self.failed(),
            self.clients_created,
            (self.finished_at - self.started_at).num_seconds()
        )
    }
}

const REJECT_COLUMNS: [&str; 8] = [
    "row", "name", "email", "phone", "service", "provider", "start", "reason",
];

/// A row in the rejects CSV
#[derive(Debug, serde::Serialize)]
struct RejectRow<'a> {
    row: usize,
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    service: &'a str,
    provider: &'a str,
    start: &'a str,
    reason: String,
}

impl<'a> From<&'a RowRecord> for RejectRow<'a> {
    fn from(record: &'a RowRecord) -> Self {
        RejectRow {
            row: record.row_number,
            name: &record.row.name,
            email: &record.row.email,
            phone: record.row.phone.as_deref(),
            service: &record.row.service,
            provider: &record.row.provider,
            start: &record.row.start,
            reason: record.outcome.reason().unwrap_or_default(),
        }
    }
}

/// Write skipped and failed rows to `path`, replacing any previous file
///
/// Atomically writes by:
/// 1. Writing to a temp file in the same directory
/// 2. Syncing to disk
/// 3. Renaming over the target
///
/// Returns the number of rows written.
pub fn write_rejects(path: &Path, report: &ImportReport) -> Result<usize> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    let mut count = 0;
    {
        // Header is written up front so an empty rejects file is still a valid feed
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(std::io::BufWriter::new(temp.as_file()));
        writer.write_record(REJECT_COLUMNS)?;
        for record in report.rejected() {
            writer.serialize(RejectRow::from(record))?;
            count += 1;
        }
        writer.flush()?;
        let mut inner = writer
            .into_inner()
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        inner.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote {} rejected rows to {:?}", count, path);
    Ok(count)
}
