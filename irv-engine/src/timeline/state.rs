//! Playback state as last confirmed by the transport

use serde::{Deserialize, Serialize};

/// Play/pause state. Changes only on transport confirmation events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
}

impl std::fmt::Display for PlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayState::Playing => write!(f, "playing"),
            PlayState::Paused => write!(f, "paused"),
        }
    }
}

/// Continuous playback position plus play state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Seconds into the track
    pub current_time: f64,
    /// Track length in seconds; 0 until metadata is known
    pub duration: f64,
    pub state: PlayState,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// False until a duration is known; the timeline has nothing to address
    pub fn has_timeline(&self) -> bool {
        self.duration > 0.0
    }

    /// Handle position along the track, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.has_timeline() {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
