//! Media transport seam
//!
//! The transport plays the audio and is the only authority on playback
//! state. The engine sends it commands and learns the outcome from the
//! events it emits; it never assumes a command succeeded.

use irv_common::{TransportBus, TransportEvent, TransportSnapshot, TransportSubscription};
use tracing::debug;

/// Commands the engine can send to a media transport
pub trait MediaTransport {
    /// Jump to `seconds`. The transport confirms with `PositionChanged`.
    fn seek(&mut self, seconds: f64);

    /// Start playback. The transport confirms with `PlayStarted`.
    fn play(&mut self);

    /// Pause playback. The transport confirms with `PlayPaused`.
    fn pause(&mut self);

    /// Subscribe to this transport's events
    fn subscribe(&self) -> TransportSubscription;

    /// Current state, read directly. Used to resynchronize after lost events.
    fn snapshot(&self) -> TransportSnapshot;
}

/// In-process transport that behaves like a media element: it only moves
/// when told to and reports each real state change exactly once.
#[derive(Debug)]
pub struct SimulatedTransport {
    bus: TransportBus,
    position: f64,
    duration: Option<f64>,
    playing: bool,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self {
            bus: TransportBus::default(),
            position: 0.0,
            duration: None,
            playing: false,
        }
    }

    /// Load media of the given length; reports `DurationKnown`
    pub fn load(&mut self, duration: f64) {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.duration = Some(duration);
        self.position = 0.0;
        self.bus.emit(TransportEvent::DurationKnown { seconds: duration });
    }

    /// Let `dt` seconds of playback elapse. Pauses at the end of the media.
    pub fn advance(&mut self, dt: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        if !self.playing || dt.is_nan() || dt <= 0.0 {
            return;
        }

        let next = (self.position + dt).min(duration);
        if next != self.position {
            self.position = next;
            self.bus.emit(TransportEvent::PositionChanged { seconds: next });
        }
        if self.position >= duration {
            self.playing = false;
            self.bus.emit(TransportEvent::PlayPaused);
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTransport for SimulatedTransport {
    fn seek(&mut self, seconds: f64) {
        let Some(duration) = self.duration else {
            debug!("Seek to {} ignored, no media loaded", seconds);
            return;
        };
        if !seconds.is_finite() {
            return;
        }
        self.position = seconds.clamp(0.0, duration);
        self.bus.emit(TransportEvent::PositionChanged {
            seconds: self.position,
        });
    }

    fn play(&mut self) {
        if self.duration.is_none() || self.playing {
            return;
        }
        self.playing = true;
        self.bus.emit(TransportEvent::PlayStarted);
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.bus.emit(TransportEvent::PlayPaused);
    }

    fn subscribe(&self) -> TransportSubscription {
        let subscription = self.bus.subscribe();
        debug!(
            "Transport subscriber attached ({} total)",
            self.bus.subscriber_count()
        );
        subscription
    }

    fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            position: self.position,
            duration: self.duration,
            playing: self.playing,
        }
    }
}
