//! Booking submission.

use crate::api::{BookingRequest, SchedulingApi};
use crate::{ResolvedRow, RowOutcome};

/// Submit one booking; exactly one attempt
///
/// A transport failure is recorded as a failed row, the run carries on.
pub fn submit_booking<A: SchedulingApi + ?Sized>(api: &mut A, row: &ResolvedRow) -> RowOutcome {
    let request = BookingRequest {
        start_datetime: row.start.clone(),
        provider_id: row.provider_id,
        service_id: row.service_id,
        client_id: row.client_id,
    };

    match api.create_booking(&request) {
        Ok(result) => result.into(),
        Err(e) => RowOutcome::Failed(format!("booking request failed: {}", e)),
    }
}
