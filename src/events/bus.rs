//! # Event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel. Units, the failure
//! latch, the orchestrator and the subscriber workers all publish on it; the
//! orchestrator's listener is the one reader and hands every event to the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! orchestrator ──┐
//! unit runners ──┼──► Bus ──► listener ──► SubscriberSet ──► subscribers
//! failure latch ─┘
//! ```
//!
//! The listener's receiver is created together with the orchestrator, before
//! any runtime exists, so `UnitRegistered` events are kept until the run starts.
//! A receiver that falls more than `capacity` events behind skips the oldest
//! ones (`RecvError::Lagged`). Publishing never blocks and never fails.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle for publishing and subscribing to runtime events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` undelivered events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev`; dropped silently when nobody listens.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
