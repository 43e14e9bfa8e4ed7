use crate::model::Event;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Position of an event in the store, in backend order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventIndex(pub usize);

/// Read-only, ordered events for one analysis result.
///
/// Replaced wholesale when a new analysis completes, never mutated in place.
/// Each store carries a fresh generation id so derived state can tell a
/// replacement apart from the store it already saw.
#[derive(Debug, Clone)]
pub struct EventStore {
    generation: Uuid,
    events: Arc<[Event]>,
}

impl EventStore {
    pub fn new(events: Vec<Event>) -> Self {
        let unseekable = events.iter().filter(|e| !e.is_seekable()).count();
        if unseekable > 0 {
            warn!(
                "{} of {} events have no usable timestamp and are kept off the timeline",
                unseekable,
                events.len()
            );
        }
        for (i, event) in events.iter().enumerate() {
            if !event.label_agrees() {
                warn!(
                    "Event #{} label '{}' disagrees with timestamp {:?}; seeking uses the timestamp",
                    i, event.time_raw, event.timestamp_sec
                );
            }
        }

        let store = Self {
            generation: Uuid::new_v4(),
            events: events.into(),
        };
        debug!("Event store {} holds {} events", store.generation, store.len());
        store
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Identity of this store; changes on every replacement
    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: EventIndex) -> Option<&Event> {
        self.events.get(index.0)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn iter_indexed(&self) -> impl Iterator<Item = (EventIndex, &Event)> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, e)| (EventIndex(i), e))
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_order() {
        let store = EventStore::new(vec![Event::new("first"), Event::new("second")]);
        let summaries: Vec<_> = store.iter().map(|e| e.event_summary.as_str()).collect();
        assert_eq!(summaries, vec!["first", "second"]);
        assert_eq!(store.get(EventIndex(1)).unwrap().event_summary, "second");
        assert!(store.get(EventIndex(2)).is_none());
    }

    #[test]
    fn test_replacement_has_new_generation() {
        let a = EventStore::new(vec![Event::new("a")]);
        let b = EventStore::new(vec![Event::new("a")]);
        assert_ne!(a.generation(), b.generation());
        assert_eq!(a.clone().generation(), a.generation());
    }

    #[test]
    fn test_empty_store() {
        let store = EventStore::default();
        assert!(store.is_empty());
        assert_eq!(store.iter_indexed().count(), 0);
    }
}
