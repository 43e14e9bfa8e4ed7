//! # Incident Review Common Library
//!
//! Shared code for the incident review workspace:
//! - Error type and result alias
//! - Configuration loading (room timestamps, classifier rules, highlighting)
//! - Transport event bus with subscribe/unsubscribe handles
//! - Human-readable clock formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use config::{ReviewConfig, RoomTimestampMap};
pub use error::{Error, Result};
pub use events::{
    TransportBus, TransportEvent, TransportNotice, TransportSnapshot, TransportSubscription,
};
