//! # Incident Review Engine (irv-engine)
//!
//! Event, timeline and floor-plan synchronization core.
//!
//! **Purpose:** Take the structured events produced by incident audio
//! analysis, decide which event owns each room, place those events on a
//! rendered floor plan, and keep both in step with audio playback. Room
//! clicks and timeline clicks become seeks; playback position changes
//! become highlighting.
//!
//! **Architecture:** Single-threaded and event-driven. The media transport
//! is the source of playback truth and reports through a subscription;
//! derived state is memoized on the identity of its inputs.

pub mod classify;
pub mod coordinator;
pub mod error;
pub mod memo;
pub mod model;
pub mod projector;
pub mod rooms;
pub mod session;
pub mod timeline;
pub mod transport;

pub use coordinator::{InteractionCoordinator, OverlayItem};
pub use error::{Error, Result};
pub use session::{ReviewSession, SubmissionFiles, SubmissionStatus};
