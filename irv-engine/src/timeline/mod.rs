//! Playback timeline: transport-driven state, seeking, markers and
//! active-event detection

pub mod controller;
pub mod markers;
pub mod schedule;
pub mod state;

pub use controller::{fraction_at, TimelineController};
pub use markers::{timeline_view, TimelineMarker, TimelineView};
pub use schedule::EventSchedule;
pub use state::{PlayState, PlaybackState};
