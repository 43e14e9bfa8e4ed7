//! Analysis session lifecycle
//!
//! One session holds the result of the latest analysis submission. A
//! successful result replaces the event store wholesale; a failure clears
//! every piece of derived state instead of leaving a previous run on screen.
//! Sending the files and preventing overlapping submissions is the upload
//! layer's job; the session only tracks where a submission stands.

use crate::coordinator::InteractionCoordinator;
use crate::model::AnalysisResult;
use crate::transport::MediaTransport;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Shown when a submission is attempted without both files
pub const MISSING_FILES_MESSAGE: &str = "Please upload both an audio file and a floor plan";

/// Files selected for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFiles {
    pub audio: Option<PathBuf>,
    pub floor_plan: Option<PathBuf>,
}

impl SubmissionFiles {
    pub fn new(audio: impl Into<PathBuf>, floor_plan: impl Into<PathBuf>) -> Self {
        Self {
            audio: Some(audio.into()),
            floor_plan: Some(floor_plan.into()),
        }
    }

    /// Both files are required before anything is submitted
    pub fn validate(&self) -> Result<()> {
        if self.audio.is_none() || self.floor_plan.is_none() {
            return Err(Error::Validation(MISSING_FILES_MESSAGE.to_string()));
        }
        Ok(())
    }
}

/// Where the latest submission stands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed { message: String },
}

pub struct ReviewSession<T: MediaTransport> {
    coordinator: InteractionCoordinator<T>,
    status: SubmissionStatus,
    incident_summary: String,
    officer_contributions: Value,
}

impl<T: MediaTransport> ReviewSession<T> {
    pub fn new(coordinator: InteractionCoordinator<T>) -> Self {
        Self {
            coordinator,
            status: SubmissionStatus::Idle,
            incident_summary: String::new(),
            officer_contributions: Value::Null,
        }
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn incident_summary(&self) -> &str {
        &self.incident_summary
    }

    /// Per-officer notes exactly as the backend sent them
    pub fn officer_contributions(&self) -> &Value {
        &self.officer_contributions
    }

    pub fn coordinator(&self) -> &InteractionCoordinator<T> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut InteractionCoordinator<T> {
        &mut self.coordinator
    }

    /// Validate the selected files and mark the submission as pending.
    ///
    /// Missing files are rejected before any state changes.
    pub fn begin_submission(&mut self, files: &SubmissionFiles) -> Result<()> {
        files.validate()?;
        if self.status == SubmissionStatus::Pending {
            debug!("Submission started while another is pending");
        }
        self.status = SubmissionStatus::Pending;
        info!("Submission pending: {:?}", files.audio);
        Ok(())
    }

    /// Install a successful analysis result
    pub fn complete(&mut self, result: AnalysisResult) {
        if self.status != SubmissionStatus::Pending {
            debug!("Analysis result installed with status {:?}", self.status);
        }
        let AnalysisResult {
            events,
            incident_summary,
            officer_contributions,
        } = result;

        self.coordinator.load_events(events);
        self.incident_summary = incident_summary;
        self.officer_contributions = officer_contributions;
        self.status = SubmissionStatus::Ready;
    }

    /// Decode and install a backend response body. An undecodable body
    /// counts as a failed submission.
    pub fn complete_json(&mut self, body: &str) -> Result<()> {
        match AnalysisResult::from_json(body) {
            Ok(result) => {
                self.complete(result);
                Ok(())
            }
            Err(e) => {
                self.fail(format!("Unreadable analysis result: {}", e));
                Err(e)
            }
        }
    }

    /// Submission failed: clear events, summary, contributions and selection
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Submission failed: {}", message);
        self.coordinator.clear_events();
        self.incident_summary.clear();
        self.officer_contributions = Value::Null;
        self.status = SubmissionStatus::Failed { message };
    }

    /// The user-visible failure, if the last submission failed
    pub fn failure(&self) -> Option<Error> {
        match &self.status {
            SubmissionStatus::Failed { message } => Some(Error::Submission(message.clone())),
            _ => None,
        }
    }
}
