//! Active-event detection along the playback position
//!
//! An event becomes active when playback reaches its timestamp and stays
//! active until the next distinct timestamp (or until the highlight window
//! runs out, when one is configured). Events that share a timestamp are
//! active together.

use crate::model::{EventIndex, EventStore};

/// Seekable events sorted by timestamp, with boundary tracking
#[derive(Debug, Clone)]
pub struct EventSchedule {
    /// `(timestamp_sec, index)` ascending by timestamp; store order within ties
    entries: Vec<(f64, EventIndex)>,

    /// Highlight duration; `None` means until the next event
    window: Option<f64>,

    /// Active set seen by the last `check_boundary` call.
    /// `None` until the first call.
    current: Option<Vec<EventIndex>>,
}

impl EventSchedule {
    /// Build from the seekable events of a store
    pub fn new(store: &EventStore, window: Option<f64>) -> Self {
        let mut entries: Vec<(f64, EventIndex)> = store
            .iter_indexed()
            .filter_map(|(index, event)| event.timestamp_sec.map(|ts| (ts, index)))
            .collect();
        // Stable sort keeps store order among equal timestamps
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self {
            entries,
            window: window.filter(|w| w.is_finite() && *w > 0.0),
            current: None,
        }
    }

    /// Events active at `position` (read-only, no boundary state change)
    pub fn active_at(&self, position: f64) -> Vec<EventIndex> {
        if !position.is_finite() {
            return Vec::new();
        }

        let end = self.entries.partition_point(|(ts, _)| *ts <= position);
        if end == 0 {
            return Vec::new();
        }

        let latest = self.entries[end - 1].0;
        if let Some(window) = self.window {
            if position - latest >= window {
                return Vec::new();
            }
        }

        let mut active: Vec<EventIndex> = self.entries[..end]
            .iter()
            .rev()
            .take_while(|(ts, _)| *ts == latest)
            .map(|(_, index)| *index)
            .collect();
        active.reverse();
        active
    }

    /// Check whether `position` moved into a different active set.
    ///
    /// Returns `(crossed, active)`. The first call never counts as a crossing.
    pub fn check_boundary(&mut self, position: f64) -> (bool, Vec<EventIndex>) {
        let active = self.active_at(position);
        let crossed = match &self.current {
            Some(previous) => *previous != active,
            None => false,
        };
        self.current = Some(active.clone());
        (crossed, active)
    }

    /// Active set as of the last boundary check
    pub fn current(&self) -> &[EventIndex] {
        self.current.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
