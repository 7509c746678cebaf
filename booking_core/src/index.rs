//! In-memory lookup over a fetched entity collection.
//!
//! Matching is exact and case-sensitive on the natural key. When several
//! entities share a key the first one in fetch order wins; every collision
//! is logged when the index is built.

use crate::{EntitySnapshot, RemoteEntity, RemoteId};
use std::collections::HashMap;

/// Lookup structure keyed by natural key and by remote id
#[derive(Clone, Debug)]
pub struct EntityIndex<T> {
    entities: Vec<T>,
    by_key: HashMap<String, usize>,
    by_id: HashMap<RemoteId, usize>,
    collisions: usize,
}

impl<T: RemoteEntity> EntityIndex<T> {
    /// Build the index over a snapshot, preserving fetch order
    pub fn build(snapshot: EntitySnapshot<T>) -> Self {
        let mut index = Self {
            entities: Vec::with_capacity(snapshot.items.len()),
            by_key: HashMap::with_capacity(snapshot.items.len()),
            by_id: HashMap::with_capacity(snapshot.items.len()),
            collisions: 0,
        };
        for entity in snapshot.items {
            index.insert(entity);
        }

        if index.collisions > 0 {
            tracing::warn!(
                "{} {} share a natural key with an earlier entry; the earliest is used",
                index.collisions,
                T::KIND
            );
        }
        tracing::debug!("Indexed {} {}", index.entities.len(), T::KIND);
        index
    }

    /// Add an entity, e.g. a client created during the run
    ///
    /// An existing entry for the same key keeps precedence. Entities with a
    /// blank natural key stay reachable by id but never match a lookup.
    pub fn insert(&mut self, entity: T) {
        let position = self.entities.len();

        match entity.natural_key() {
            None => {
                tracing::debug!("{} id {} has no natural key, not indexed", T::KIND, entity.id());
            }
            Some(key) => match self.by_key.get(key) {
                Some(&existing) => {
                    self.collisions += 1;
                    tracing::warn!(
                        "{} key {:?} matches ids {} and {}; using {}",
                        T::KIND,
                        key,
                        self.entities[existing].id(),
                        entity.id(),
                        self.entities[existing].id()
                    );
                }
                None => {
                    self.by_key.insert(key.to_string(), position);
                }
            },
        }

        self.by_id.entry(entity.id()).or_insert(position);
        self.entities.push(entity);
    }

    /// Find the entity whose natural key equals `key`
    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.by_key.get(key).map(|&i| &self.entities[i])
    }

    /// Find an entity by remote id
    pub fn get(&self, id: RemoteId) -> Option<&T> {
        self.by_id.get(&id).map(|&i| &self.entities[i])
    }

    /// Number of natural keys shared by more than one entity
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Client, Provider};

    fn provider(id: RemoteId, name: &str) -> Provider {
        Provider {
            id,
            name: name.into(),
        }
    }

    fn snapshot<T>(items: Vec<T>) -> EntitySnapshot<T> {
        let total = items.len();
        EntitySnapshot {
            items,
            reported_total: total,
            pages_fetched: 1,
        }
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let index = EntityIndex::build(snapshot(vec![
            provider(7, "Dr. Smith"),
            provider(8, "Dr. Jones"),
        ]));

        assert_eq!(index.lookup("Dr. Smith").map(|p| p.id), Some(7));
        assert_eq!(index.get(8).map(|p| p.name.as_str()), Some("Dr. Jones"));
        assert!(index.lookup("Dr. Who").is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let index = EntityIndex::build(snapshot(vec![provider(7, "Dr. Smith")]));

        assert!(index.lookup("dr. smith").is_none());
        assert!(index.lookup("Dr. Smith ").is_none());
        assert!(index.lookup("Dr. Smith").is_some());
    }

    #[test]
    fn test_first_match_wins_on_collision() {
        let index = EntityIndex::build(snapshot(vec![
            provider(7, "Dr. Smith"),
            provider(9, "Dr. Smith"),
        ]));

        assert_eq!(index.lookup("Dr. Smith").map(|p| p.id), Some(7));
        assert_eq!(index.collisions(), 1);
        // Both remain reachable by id
        assert!(index.get(9).is_some());
    }

    #[test]
    fn test_insert_created_client_becomes_visible() {
        let mut index: EntityIndex<Client> = EntityIndex::build(snapshot(vec![]));
        assert!(index.is_empty());

        index.insert(Client {
            id: 42,
            name: "Alice".into(),
            email: "a@x.com".into(),
            phone: Some("555".into()),
        });

        assert_eq!(index.lookup("a@x.com").map(|c| c.id), Some(42));
        assert_eq!(index.collisions(), 0);
    }

    #[test]
    fn test_blank_keys_are_not_indexed() {
        let walk_in = |id| Client {
            id,
            name: "Walk-in".into(),
            email: String::new(),
            phone: None,
        };
        let index = EntityIndex::build(snapshot(vec![walk_in(12), walk_in(13)]));

        assert!(index.lookup("").is_none());
        assert_eq!(index.collisions(), 0);
        assert_eq!(index.get(13).map(|c| c.id), Some(13));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_lookup_is_repeatable() {
        let index = EntityIndex::build(snapshot(vec![provider(1, "A"), provider(2, "B")]));
        let first = index.lookup("B").map(|p| p.id);
        let second = index.lookup("B").map(|p| p.id);
        assert_eq!(first, second);
        assert_eq!(index.iter().count(), 2);
    }
}
