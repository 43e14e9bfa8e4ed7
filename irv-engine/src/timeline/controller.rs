//! Timeline controller
//!
//! Owns the playback state and the transport. Position, duration and
//! play/pause come from transport events; seeks are sent to the transport
//! and applied optimistically, with the transport's own position event
//! correcting any drift.

use super::state::{PlayState, PlaybackState};
use crate::transport::MediaTransport;
use irv_common::{TransportEvent, TransportSubscription};
use tracing::{debug, info, warn};

pub struct TimelineController<T: MediaTransport> {
    transport: T,
    /// Present while attached to the transport; dropping it unsubscribes
    subscription: Option<TransportSubscription>,
    playback: PlaybackState,
}

impl<T: MediaTransport> TimelineController<T> {
    /// Attach to a transport and start listening to its events
    pub fn new(transport: T) -> Self {
        let subscription = transport.subscribe();
        Self {
            transport,
            subscription: Some(subscription),
            playback: PlaybackState::default(),
        }
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time
    }

    pub fn duration(&self) -> f64 {
        self.playback.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply every pending transport event. Returns how many were applied.
    ///
    /// If the subscription lagged, confirmations may have been lost, so the
    /// state is then re-read from the transport itself.
    pub fn pump(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };
        let notices = subscription.drain();
        let missed = subscription.take_missed();

        let count = notices.len();
        for notice in notices {
            self.apply(notice.event);
        }
        if missed > 0 {
            self.resync();
        }
        count
    }

    /// Adopt the transport's current state wholesale
    fn resync(&mut self) {
        let snapshot = self.transport.snapshot();
        info!(
            "Resynchronizing from transport: position {:.2}s, duration {:?}, playing {}",
            snapshot.position, snapshot.duration, snapshot.playing
        );
        if let Some(duration) = snapshot.duration {
            self.report_duration(duration);
        }
        self.report_position(snapshot.position);
        self.report_play_state(snapshot.playing);
    }

    /// Apply one transport event
    pub fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PositionChanged { seconds } => self.report_position(seconds),
            TransportEvent::DurationKnown { seconds } => self.report_duration(seconds),
            TransportEvent::PlayStarted => self.report_play_state(true),
            TransportEvent::PlayPaused => self.report_play_state(false),
        }
    }

    /// Transport reported a new position
    pub fn report_position(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            warn!("Ignoring non-finite position report {}", seconds);
            return;
        }
        self.playback.current_time = self.clamp_time(seconds);
    }

    /// Transport metadata loaded
    pub fn report_duration(&mut self, seconds: f64) {
        let duration = if seconds.is_finite() && seconds >= 0.0 {
            seconds
        } else {
            warn!("Unusable duration report {}, treating as 0", seconds);
            0.0
        };
        self.playback.duration = duration;
        self.playback.current_time = self.clamp_time(self.playback.current_time);
        info!("Track duration {:.1}s", duration);
    }

    /// Transport confirmed play or pause
    pub fn report_play_state(&mut self, playing: bool) {
        let state = if playing {
            PlayState::Playing
        } else {
            PlayState::Paused
        };
        if self.playback.state != state {
            debug!("Playback {} -> {}", self.playback.state, state);
            self.playback.state = state;
        }
    }

    /// Seek to an absolute time.
    ///
    /// Clamps to `[0, duration]` and returns the target, or `None` when no
    /// duration is known yet.
    pub fn seek_to(&mut self, seconds: f64) -> Option<f64> {
        if !self.playback.has_timeline() {
            debug!("Seek to {} ignored, duration unknown", seconds);
            return None;
        }
        if !seconds.is_finite() {
            warn!("Ignoring non-finite seek target {}", seconds);
            return None;
        }

        let target = seconds.clamp(0.0, self.playback.duration);
        self.transport.seek(target);
        self.playback.current_time = target;
        debug!("Seek to {:.2}s", target);
        Some(target)
    }

    /// Seek to a fraction of the track, e.g. from a click along the scrub bar
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<f64> {
        if !self.playback.has_timeline() {
            debug!("Fractional seek {} ignored, duration unknown", fraction);
            return None;
        }
        if !fraction.is_finite() {
            warn!("Ignoring non-finite seek fraction {}", fraction);
            return None;
        }
        self.seek_to(fraction.clamp(0.0, 1.0) * self.playback.duration)
    }

    /// Ask the transport to play; state changes on its confirmation
    pub fn request_play(&mut self) {
        self.transport.play();
    }

    /// Ask the transport to pause; state changes on its confirmation
    pub fn request_pause(&mut self) {
        self.transport.pause();
    }

    /// Request the opposite of the last confirmed state
    pub fn toggle_play(&mut self) {
        if self.playback.is_playing() {
            self.request_pause();
        } else {
            self.request_play();
        }
    }

    /// Stop listening to the transport
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        if self.playback.has_timeline() {
            seconds.clamp(0.0, self.playback.duration)
        } else {
            seconds.max(0.0)
        }
    }
}

/// Fraction of the track under a click at `offset_x` pixels from the
/// track's left edge. `None` for a track with no width.
pub fn fraction_at(offset_x: f64, track_width: f64) -> Option<f64> {
    if !(track_width.is_finite() && track_width > 0.0) || !offset_x.is_finite() {
        return None;
    }
    Some((offset_x / track_width).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SimulatedTransport;

    fn loaded(duration: f64) -> TimelineController<SimulatedTransport> {
        let mut controller = TimelineController::new(SimulatedTransport::new());
        controller.transport_mut().load(duration);
        controller.pump();
        controller
    }

    #[test]
    fn test_fraction_seek_half() {
        let mut controller = loaded(100.0);
        assert_eq!(controller.seek_to_fraction(0.5), Some(50.0));
        assert_eq!(controller.current_time(), 50.0);
    }

    #[test]
    fn test_fraction_seek_idempotent() {
        let mut controller = loaded(100.0);
        controller.seek_to_fraction(0.5);
        controller.pump();
        controller.seek_to_fraction(0.5);
        controller.pump();
        assert_eq!(controller.current_time(), 50.0);
        assert_eq!(controller.transport().position(), 50.0);
    }

    #[test]
    fn test_zero_duration_seeks_are_noops() {
        let mut controller = TimelineController::new(SimulatedTransport::new());
        assert_eq!(controller.seek_to(12.0), None);
        assert_eq!(controller.seek_to_fraction(0.5), None);
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut controller = loaded(60.0);
        assert_eq!(controller.seek_to(90.0), Some(60.0));
        assert_eq!(controller.seek_to(-5.0), Some(0.0));
        assert_eq!(controller.seek_to_fraction(1.5), Some(60.0));
    }

    #[test]
    fn test_position_reports_clamped() {
        let mut controller = loaded(60.0);
        controller.report_position(75.0);
        assert_eq!(controller.current_time(), 60.0);
        controller.report_position(-1.0);
        assert_eq!(controller.current_time(), 0.0);
        controller.report_position(f64::NAN);
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn test_play_state_follows_transport_confirmation() {
        let mut controller = loaded(60.0);

        controller.request_play();
        // Not confirmed yet
        assert!(!controller.is_playing());

        controller.pump();
        assert!(controller.is_playing());

        controller.toggle_play();
        assert!(controller.is_playing());
        controller.pump();
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_transport_position_corrects_optimistic_seek() {
        let mut controller = loaded(60.0);
        controller.seek_to(10.0);
        controller.report_position(10.4);
        assert_eq!(controller.current_time(), 10.4);
    }

    #[test]
    fn test_detach_stops_updates() {
        let mut controller = loaded(60.0);
        controller.detach();
        assert!(!controller.is_attached());

        controller.transport_mut().play();
        assert_eq!(controller.pump(), 0);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_lagged_confirmations_recovered_from_transport() {
        let mut controller = TimelineController::new(SimulatedTransport::new());
        controller.transport_mut().load(1000.0);
        controller.transport_mut().play();
        // Far more events than the bus holds; DurationKnown and PlayStarted
        // are overwritten before the first pump
        for _ in 0..100 {
            controller.transport_mut().advance(0.25);
        }

        controller.pump();

        assert!(controller.is_playing());
        assert_eq!(controller.duration(), 1000.0);
        assert_eq!(controller.current_time(), 25.0);
        assert_eq!(controller.seek_to(40.0), Some(40.0));
    }

    #[test]
    fn test_fraction_at() {
        assert_eq!(fraction_at(50.0, 200.0), Some(0.25));
        assert_eq!(fraction_at(-10.0, 200.0), Some(0.0));
        assert_eq!(fraction_at(250.0, 200.0), Some(1.0));
        assert_eq!(fraction_at(10.0, 0.0), None);
    }
}
