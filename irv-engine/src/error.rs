//! Error types for irv-engine
//!
//! Only submission-level problems surface as errors. Derived-state problems
//! (malformed events, rooms missing from the floor plan, zero duration)
//! degrade locally and are logged instead.

use thiserror::Error;

/// Main error type for the review engine
#[derive(Error, Debug)]
pub enum Error {
    /// Submission rejected before anything was sent (missing files)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Analysis backend reported a failure
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Analysis result or layout could not be decoded
    #[error("Malformed input: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Configuration, I/O and other shared errors
    #[error(transparent)]
    Common(#[from] irv_common::Error),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
