//! Incident data received from the analysis backend

mod analysis;
mod event;
mod store;

pub use analysis::AnalysisResult;
pub use event::{Event, Urgency};
pub use store::{EventIndex, EventStore};
