//! Core domain types for the booking importer.
//!
//! This module defines:
//! - Remote entities (clients, providers, services) and their natural keys
//! - Input feed rows
//! - Per-row resolution and outcome types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Remote-assigned identifier
pub type RemoteId = u64;

// ============================================================================
// Remote Entities
// ============================================================================

/// Entity collections fetched in full at the start of each run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Clients,
    Providers,
    Services,
}

impl EntityKind {
    /// Path segment below the admin API base
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Clients => "clients",
            EntityKind::Providers => "providers",
            EntityKind::Services => "services",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A record fetched from the scheduling service
pub trait RemoteEntity: DeserializeOwned + Clone + fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> RemoteId;

    /// Field input rows are matched on; `None` when the record leaves it blank
    fn natural_key(&self) -> Option<&str>;
}

/// Treat an explicit `null` like a missing field
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(key: &str) -> Option<&str> {
    Some(key).filter(|k| !k.trim().is_empty())
}

/// A client (customer) of the company
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl RemoteEntity for Client {
    const KIND: EntityKind = EntityKind::Clients;

    fn id(&self) -> RemoteId {
        self.id
    }

    fn natural_key(&self) -> Option<&str> {
        non_blank(&self.email)
    }
}

/// A staff member bookings are made with
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl RemoteEntity for Provider {
    const KIND: EntityKind = EntityKind::Providers;

    fn id(&self) -> RemoteId {
        self.id
    }

    fn natural_key(&self) -> Option<&str> {
        non_blank(&self.name)
    }
}

/// A bookable service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl RemoteEntity for Service {
    const KIND: EntityKind = EntityKind::Services;

    fn id(&self) -> RemoteId {
        self.id
    }

    fn natural_key(&self) -> Option<&str> {
        non_blank(&self.name)
    }
}

/// Complete read of one entity collection
///
/// `items.len() == reported_total` holds for every snapshot returned by
/// [`crate::fetcher::fetch_all`].
#[derive(Clone, Debug)]
pub struct EntitySnapshot<T> {
    pub items: Vec<T>,
    pub reported_total: usize,
    pub pages_fetched: u32,
}

impl<T> EntitySnapshot<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Input Feed
// ============================================================================

/// One line of the booking feed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub service: String,
    pub provider: String,
    /// Start datetime, sent to the service verbatim
    pub start: String,
}

// ============================================================================
// Resolution and Outcomes
// ============================================================================

/// Where the client id of a resolved row came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientSource {
    Existing,
    Created,
}

/// A row whose names and email have all been mapped to remote ids
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRow {
    pub service_id: RemoteId,
    pub provider_id: RemoteId,
    pub client_id: RemoteId,
    pub client_source: ClientSource,
    pub start: String,
}

/// Why a row was not attempted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    ServiceNotMatched(String),
    ProviderNotMatched(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ServiceNotMatched(name) => write!(f, "service not matched: {}", name),
            SkipReason::ProviderNotMatched(name) => write!(f, "provider not matched: {}", name),
        }
    }
}

/// Per-row failure raised while resolving a row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowError {
    Skipped(SkipReason),
    Failed(String),
}

impl From<SkipReason> for RowError {
    fn from(reason: SkipReason) -> Self {
        RowError::Skipped(reason)
    }
}

/// Terminal classification of one input row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    Skipped(SkipReason),
    Created(RemoteId),
    Failed(String),
}

impl RowOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, RowOutcome::Created(_))
    }

    /// Human-readable reason for rows that did not produce a booking
    pub fn reason(&self) -> Option<String> {
        match self {
            RowOutcome::Skipped(reason) => Some(reason.to_string()),
            RowOutcome::Failed(reason) => Some(reason.clone()),
            RowOutcome::Created(_) => None,
        }
    }
}

impl From<RowError> for RowOutcome {
    fn from(err: RowError) -> Self {
        match err {
            RowError::Skipped(reason) => RowOutcome::Skipped(reason),
            RowError::Failed(reason) => RowOutcome::Failed(reason),
        }
    }
}

/// Parsed answer to a booking-creation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingResult {
    Success(RemoteId),
    Error(String),
}

impl From<BookingResult> for RowOutcome {
    fn from(result: BookingResult) -> Self {
        match result {
            BookingResult::Success(id) => RowOutcome::Created(id),
            BookingResult::Error(message) => RowOutcome::Failed(message),
        }
    }
}

/// Parsed answer to a client-creation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientResult {
    Created(RemoteId),
    Error(String),
}
