//! Transport event types and the bus that carries them
//!
//! The media transport (the platform audio element, or a simulated one) is
//! the source of playback truth. It reports state changes through a
//! [`TransportBus`]; consumers hold a [`TransportSubscription`] and poll it
//! synchronously. Dropping the subscription unsubscribes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

/// Events reported by the media transport, once per real state change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransportEvent {
    /// Playback position moved (time update or completed seek)
    PositionChanged { seconds: f64 },

    /// Media metadata loaded; total duration is now known
    DurationKnown { seconds: f64 },

    /// Transport started playing
    PlayStarted,

    /// Transport paused
    PlayPaused,
}

/// A transport event stamped with the time it was emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportNotice {
    pub event: TransportEvent,
    pub emitted_at: DateTime<Utc>,
}

/// Point-in-time transport state, read directly from the transport.
///
/// Used to recover after a subscriber lagged and lost notices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    pub position: f64,
    /// `None` until media metadata has loaded
    pub duration: Option<f64>,
    pub playing: bool,
}

/// Broadcast channel for transport events
#[derive(Debug, Clone)]
pub struct TransportBus {
    tx: broadcast::Sender<TransportNotice>,
}

impl TransportBus {
    /// Creates a new bus buffering up to `capacity` events per subscriber
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers
    ///
    /// Returns the number of subscribers that will see it. Emitting with no
    /// subscribers is not an error.
    pub fn emit(&self, event: TransportEvent) -> usize {
        let notice = TransportNotice {
            event,
            emitted_at: Utc::now(),
        };
        match self.tx.send(notice) {
            Ok(count) => count,
            Err(_) => {
                debug!("Transport event {:?} emitted with no subscribers", event);
                0
            }
        }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> TransportSubscription {
        TransportSubscription {
            rx: self.tx.subscribe(),
            missed: 0,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for TransportBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Scoped subscription handle. Delivery stops when the handle is dropped.
#[derive(Debug)]
pub struct TransportSubscription {
    rx: broadcast::Receiver<TransportNotice>,
    /// Notices overwritten before they were read, since the last `take_missed`
    missed: u64,
}

impl TransportSubscription {
    /// Next pending event without blocking
    ///
    /// If the subscriber fell behind, the overwritten events are counted
    /// (see [`take_missed`](Self::take_missed)) and the oldest retained event
    /// is returned instead.
    pub fn try_next(&mut self) -> Option<TransportNotice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) => return Some(notice),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Transport subscription lagged, {} events dropped", skipped);
                    self.missed += skipped;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// All pending events, oldest first
    pub fn drain(&mut self) -> Vec<TransportNotice> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Number of notices lost to lag since the last call, resetting the count.
    ///
    /// Non-zero means state confirmations may be missing and the consumer
    /// must resynchronize from a [`TransportSnapshot`].
    pub fn take_missed(&mut self) -> u64 {
        std::mem::take(&mut self.missed)
    }

    /// Explicitly end the subscription
    pub fn unsubscribe(self) {
        debug!("Transport subscription released");
    }
}
