//! Row reconciliation: mapping feed rows onto remote ids.
//!
//! Service and provider must already exist remotely; a missing client is
//! created on the fly and added to the client index so later rows with the
//! same email reuse it. A row without an email cannot be tied to a client
//! and fails.

use crate::api::{NewClient, SchedulingApi};
use crate::index::EntityIndex;
use crate::{
    Client, ClientResult, ClientSource, ImportRow, Provider, RemoteId, ResolvedRow, RowError,
    Service, SkipReason,
};
use std::collections::HashSet;

const NO_EMAIL: &str = "row has no email";

/// Indices over the three collections fetched at the start of a run
#[derive(Clone, Debug)]
pub struct Indices {
    pub services: EntityIndex<Service>,
    pub providers: EntityIndex<Provider>,
    pub clients: EntityIndex<Client>,
}

/// Resolve service and provider names; no network access
pub fn match_row(
    row: &ImportRow,
    services: &EntityIndex<Service>,
    providers: &EntityIndex<Provider>,
) -> Result<(RemoteId, RemoteId), SkipReason> {
    let service = services
        .lookup(&row.service)
        .ok_or_else(|| SkipReason::ServiceNotMatched(row.service.clone()))?;
    let provider = providers
        .lookup(&row.provider)
        .ok_or_else(|| SkipReason::ProviderNotMatched(row.provider.clone()))?;
    Ok((service.id, provider.id))
}

/// Resolve every id a booking needs, creating the client if necessary
pub fn resolve<A: SchedulingApi + ?Sized>(
    api: &mut A,
    row: &ImportRow,
    indices: &mut Indices,
) -> Result<ResolvedRow, RowError> {
    let (service_id, provider_id) = match_row(row, &indices.services, &indices.providers)?;
    if row.email.trim().is_empty() {
        return Err(RowError::Failed(NO_EMAIL.into()));
    }

    let (client_id, client_source) = match indices.clients.lookup(&row.email) {
        Some(client) => (client.id, ClientSource::Existing),
        None => {
            let id = create_client(api, row)?;
            indices.clients.insert(Client {
                id,
                name: row.name.clone(),
                email: row.email.clone(),
                phone: row.phone.clone(),
            });
            (id, ClientSource::Created)
        }
    };

    Ok(ResolvedRow {
        service_id,
        provider_id,
        client_id,
        client_source,
        start: row.start.clone(),
    })
}

/// Create a client from the row's contact fields
///
/// Rejections and transport failures are row failures.
pub fn create_client<A: SchedulingApi + ?Sized>(
    api: &mut A,
    row: &ImportRow,
) -> Result<RemoteId, RowError> {
    let payload = NewClient {
        name: row.name.clone(),
        email: row.email.clone(),
        phone: row.phone.clone(),
    };
    tracing::debug!("Creating client {} <{}>", payload.name, payload.email);

    match api.create_client(&payload) {
        Ok(ClientResult::Created(id)) => {
            tracing::info!("Created client {} for {}", id, payload.email);
            Ok(id)
        }
        Ok(ClientResult::Error(message)) => Err(RowError::Failed(format!(
            "client creation failed for {}: {}",
            payload.email, message
        ))),
        Err(e) => Err(RowError::Failed(format!(
            "client creation failed for {}: {}",
            payload.email, e
        ))),
    }
}

// ============================================================================
// Dry-run planning
// ============================================================================

/// What a client lookup would lead to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientPlan {
    Existing(RemoteId),
    /// First row in the feed for an unknown email
    Create,
    /// Unknown email already scheduled for creation by an earlier row
    CreatedEarlier,
}

/// What a real run would do with a row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowPlan {
    Skip(SkipReason),
    Fail(String),
    Book {
        service_id: RemoteId,
        provider_id: RemoteId,
        client: ClientPlan,
    },
}

/// Plan a row without touching the service
///
/// `pending` collects emails that earlier rows would create.
pub fn plan_row(row: &ImportRow, indices: &Indices, pending: &mut HashSet<String>) -> RowPlan {
    let (service_id, provider_id) = match match_row(row, &indices.services, &indices.providers) {
        Ok(ids) => ids,
        Err(reason) => return RowPlan::Skip(reason),
    };
    if row.email.trim().is_empty() {
        return RowPlan::Fail(NO_EMAIL.into());
    }

    let client = match indices.clients.lookup(&row.email) {
        Some(client) => ClientPlan::Existing(client.id),
        None if pending.insert(row.email.clone()) => ClientPlan::Create,
        None => ClientPlan::CreatedEarlier,
    };

    RowPlan::Book {
        service_id,
        provider_id,
        client,
    }
}
