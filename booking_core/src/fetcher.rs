//! Paginated full-collection reads.
//!
//! A collection is read page by page until the number of distinct items
//! collected equals the `items_count` the server reports. Anything else is
//! an inconsistent read and aborts the run.

use crate::api::SchedulingApi;
use crate::{EntitySnapshot, Error, RemoteEntity, Result};
use std::collections::HashSet;

/// Fetch every item of `T`'s collection
///
/// The page sequence counts as exhausted when a page comes back empty, when
/// a page adds no item that was not seen before, when the server-reported
/// page count has been reached, or when more items than reported have been
/// collected. Reaching any of those without matching the total is a
/// [`Error::CountMismatch`].
pub fn fetch_all<T, A>(api: &mut A) -> Result<EntitySnapshot<T>>
where
    T: RemoteEntity,
    A: SchedulingApi + ?Sized,
{
    let kind = T::KIND;
    let mut items: Vec<T> = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 1u32;

    loop {
        tracing::debug!("Fetching {}... paginator: {}", kind, page);
        let response = api.fetch_page(kind, page)?;
        let expected = response.metadata.items_count;
        let received = response.data.len();

        let mut added = 0usize;
        for value in response.data {
            let item: T = serde_json::from_value(value)?;
            if seen.insert(item.id()) {
                items.push(item);
                added += 1;
            } else {
                tracing::warn!(
                    "{} id {} returned more than once, ignoring repeat",
                    kind,
                    item.id()
                );
            }
        }

        if items.len() == expected {
            tracing::info!("Fetched {} {} in {} page(s)", items.len(), kind, page);
            return Ok(EntitySnapshot {
                items,
                reported_total: expected,
                pages_fetched: page,
            });
        }

        let last_page = response
            .metadata
            .pages_count
            .is_some_and(|pages| page >= pages);
        if received == 0 || added == 0 || last_page || items.len() > expected {
            tracing::error!("failed to obtain correct item counts on {}", kind);
            return Err(Error::CountMismatch {
                entity: kind.to_string(),
                expected,
                actual: items.len(),
            });
        }

        page += 1;
    }
}
