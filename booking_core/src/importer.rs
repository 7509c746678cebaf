//! Import orchestration.
//!
//! `Start → FetchEntities → (ReconcileRow → SubmitBooking)* → Done`.
//! Fetching is all-or-nothing; after that every row is processed on its own
//! and a bad row never stops the ones after it.

use crate::api::SchedulingApi;
use crate::fetcher::fetch_all;
use crate::index::EntityIndex;
use crate::reconcile::{plan_row, resolve, Indices, RowPlan};
use crate::report::{ImportReport, RowRecord};
use crate::submit::submit_booking;
use crate::{ClientSource, ImportRow, Result, RowOutcome};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Fetch and index clients, providers and services
pub fn load_indices<A: SchedulingApi + ?Sized>(api: &mut A) -> Result<Indices> {
    let clients = EntityIndex::build(fetch_all(api)?);
    let providers = EntityIndex::build(fetch_all(api)?);
    let services = EntityIndex::build(fetch_all(api)?);
    Ok(Indices {
        services,
        providers,
        clients,
    })
}

/// Run a full import over `rows`
///
/// Returns `Err` only for fatal errors, all of which happen before the
/// first row is touched.
pub fn run_import<A: SchedulingApi + ?Sized>(
    api: &mut A,
    rows: &[ImportRow],
    run_id: Uuid,
) -> Result<ImportReport> {
    let mut report = ImportReport::new(run_id);
    let mut indices = load_indices(api)?;

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        let outcome = process_row(api, row, &mut indices, &mut report.clients_created);
        log_outcome(row_number, row, &outcome);
        report.records.push(RowRecord {
            row_number,
            row: row.clone(),
            outcome,
        });
    }

    report.finished_at = Utc::now();
    tracing::info!("{}", report.summary());
    Ok(report)
}

fn process_row<A: SchedulingApi + ?Sized>(
    api: &mut A,
    row: &ImportRow,
    indices: &mut Indices,
    clients_created: &mut usize,
) -> RowOutcome {
    let resolved = match resolve(api, row, indices) {
        Ok(resolved) => resolved,
        Err(e) => return e.into(),
    };
    if resolved.client_source == ClientSource::Created {
        *clients_created += 1;
    }
    submit_booking(api, &resolved)
}

fn log_outcome(row_number: usize, row: &ImportRow, outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Created(id) => {
            tracing::debug!(
                "Successfully created booking {} from CSV row {}",
                id,
                row_number
            );
        }
        RowOutcome::Skipped(reason) => {
            tracing::error!(
                "Unable to import CSV row {} ({}, {} with {} at {}): {}, import skipped",
                row_number,
                row.email,
                row.service,
                row.provider,
                row.start,
                reason
            );
        }
        RowOutcome::Failed(reason) => {
            tracing::error!(
                "Failed to create booking from CSV row {} ({}, {} with {} at {}) - {}",
                row_number,
                row.email,
                row.service,
                row.provider,
                row.start,
                reason
            );
        }
    }
}

/// Dry-run result for one row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRow {
    pub row_number: usize,
    pub plan: RowPlan,
}

/// Fetch and index like a real run, then plan every row without mutating
/// anything remotely
pub fn plan_import<A: SchedulingApi + ?Sized>(
    api: &mut A,
    rows: &[ImportRow],
) -> Result<Vec<PlannedRow>> {
    let indices = load_indices(api)?;
    let mut pending = HashSet::new();

    Ok(rows
        .iter()
        .enumerate()
        .map(|(i, row)| PlannedRow {
            row_number: i + 1,
            plan: plan_row(row, &indices, &mut pending),
        })
        .collect())
}
