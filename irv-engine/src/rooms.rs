//! Room resolution
//!
//! Several events can name the same room. Each room is owned by exactly one
//! event: the one with the highest urgency rank. Ties keep the event that
//! appeared first in the store, since a later event only takes over with a
//! strictly greater rank.

use crate::model::{Event, EventIndex, EventStore};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Owning event per room, keyed by location id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRooms {
    by_location: BTreeMap<String, EventIndex>,
}

impl ResolvedRooms {
    /// Index of the event that owns `location`, if any
    pub fn get(&self, location: &str) -> Option<EventIndex> {
        self.by_location.get(location).copied()
    }

    /// Owning event for `location`, looked up in the store it was resolved from
    pub fn event<'a>(&self, store: &'a EventStore, location: &str) -> Option<&'a Event> {
        self.get(location).and_then(|index| store.get(index))
    }

    pub fn contains(&self, location: &str) -> bool {
        self.by_location.contains_key(location)
    }

    /// Locations in lexical order
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.by_location.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, EventIndex)> {
        self.by_location.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

/// Resolve the owning event for every room mentioned in the store.
///
/// Events without a location are skipped. Unknown urgency ranks lowest.
pub fn resolve_rooms(store: &EventStore) -> ResolvedRooms {
    let mut by_location: BTreeMap<String, EventIndex> = BTreeMap::new();

    for (index, event) in store.iter_indexed() {
        let Some(location) = event.location.as_deref() else {
            continue;
        };

        match by_location.entry(location.to_string()) {
            Entry::Occupied(mut holder) => {
                let held_rank = store.get(*holder.get()).map_or(0, |e| e.urgency.rank());
                if event.urgency.rank() > held_rank {
                    holder.insert(index);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    debug!(
        "Resolved {} rooms from {} events",
        by_location.len(),
        store.len()
    );
    ResolvedRooms { by_location }
}
