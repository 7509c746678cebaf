//! Scheduling service API surface.
//!
//! [`SchedulingApi`] is the seam between the import pipeline and the
//! network. The HTTP implementation lives in [`crate::session`]; tests drive
//! the pipeline with an in-memory implementation.

use crate::{BookingResult, ClientResult, EntityKind, RemoteId, Result};
use serde::{Deserialize, Serialize};

/// One page of a paginated collection read
#[derive(Clone, Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    pub metadata: PageMetadata,
}

/// Pagination metadata reported alongside every page
#[derive(Clone, Debug, Deserialize)]
pub struct PageMetadata {
    /// Total number of items in the collection
    pub items_count: usize,
    #[serde(default)]
    pub pages_count: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub on_page: Option<u32>,
}

/// Payload for client creation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Payload for booking creation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingRequest {
    pub start_datetime: String,
    pub provider_id: RemoteId,
    pub service_id: RemoteId,
    pub client_id: RemoteId,
}

/// Operations the import pipeline needs from the scheduling service
///
/// Collection reads return `Err` on transport failure, which is fatal for
/// the run. Mutations report rejections through their result types and
/// return `Err` only when the request could not be carried out at all.
pub trait SchedulingApi {
    /// Fetch one page (1-based) of an entity collection
    fn fetch_page(&mut self, kind: EntityKind, page: u32) -> Result<Page>;

    fn create_client(&mut self, client: &NewClient) -> Result<ClientResult>;

    fn create_booking(&mut self, booking: &BookingRequest) -> Result<BookingResult>;
}

#[derive(Deserialize)]
struct BookingRecord {
    id: RemoteId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookingResponse {
    Created {
        bookings: Vec<BookingRecord>,
    },
    Rejected {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
}

/// Interpret the body returned by `POST /bookings`
///
/// Bodies that are not JSON at all (proxy error pages and the like) are
/// reported verbatim.
pub fn parse_booking_response(body: &str) -> BookingResult {
    match serde_json::from_str::<BookingResponse>(body) {
        Ok(BookingResponse::Created { bookings }) => match bookings.first() {
            Some(record) => BookingResult::Success(record.id),
            None => BookingResult::Error("booking response contained no bookings".into()),
        },
        Ok(BookingResponse::Rejected { message, data }) => {
            BookingResult::Error(rejection_message(message, data, body))
        }
        Err(_) => BookingResult::Error(body.trim().to_string()),
    }
}

#[derive(Deserialize)]
struct ClientResponse {
    #[serde(default)]
    id: Option<RemoteId>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Interpret the body returned by `POST /clients`
pub fn parse_client_response(body: &str) -> ClientResult {
    match serde_json::from_str::<ClientResponse>(body) {
        Ok(ClientResponse { id: Some(id), .. }) => ClientResult::Created(id),
        Ok(ClientResponse { message, data, .. }) => {
            ClientResult::Error(rejection_message(message, data, body))
        }
        Err(_) => ClientResult::Error(body.trim().to_string()),
    }
}

fn rejection_message(
    message: Option<String>,
    data: Option<serde_json::Value>,
    body: &str,
) -> String {
    match (message, data) {
        (Some(message), Some(data)) if !data.is_null() => format!("{} ({})", message, data),
        (Some(message), _) => message,
        (None, Some(serde_json::Value::String(data))) => data,
        (None, Some(data)) if !data.is_null() => data.to_string(),
        _ => body.trim().to_string(),
    }
}
