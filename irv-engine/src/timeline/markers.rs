//! Timeline render input

use super::state::PlaybackState;
use crate::model::{EventIndex, EventStore, Urgency};
use irv_common::human_time::format_clock;
use serde::Serialize;

/// One event marker on the scrub track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineMarker {
    pub index: EventIndex,
    pub timestamp_sec: f64,
    pub urgency: Urgency,
    pub summary: String,
    /// Tooltip label: the backend's time label, or a formatted clock
    pub label: String,
    /// Position along the track, 0.0 to 1.0
    pub position_ratio: f64,
    pub active: bool,
}

/// Everything the presentation layer needs to draw the scrub track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub duration: f64,
    pub current_time: f64,
    pub handle_ratio: f64,
    /// Seekable events in store order
    pub markers: Vec<TimelineMarker>,
}

/// Build the scrub-track view. `None` while the duration is unknown.
///
/// Events without a usable timestamp are left off the track.
pub fn timeline_view(
    store: &EventStore,
    playback: &PlaybackState,
    active: &[EventIndex],
) -> Option<TimelineView> {
    if !playback.has_timeline() {
        return None;
    }

    let markers = store
        .iter_indexed()
        .filter_map(|(index, event)| {
            let timestamp_sec = event.timestamp_sec?;
            let label = if event.time_raw.is_empty() {
                format_clock(timestamp_sec)
            } else {
                event.time_raw.clone()
            };
            Some(TimelineMarker {
                index,
                timestamp_sec,
                urgency: event.urgency,
                summary: event.event_summary.clone(),
                label,
                position_ratio: (timestamp_sec / playback.duration).clamp(0.0, 1.0),
                active: active.contains(&index),
            })
        })
        .collect();

    Some(TimelineView {
        duration: playback.duration,
        current_time: playback.current_time,
        handle_ratio: playback.progress(),
        markers,
    })
}
