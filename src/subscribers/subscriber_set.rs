//! # Fan-out to subscribers.
//!
//! [`SubscriberSet`] owns one bounded `mpsc` queue and one worker task per
//! subscriber. `emit` only ever calls `try_send`, so the listener is never held
//! up by a slow subscriber.
//!
//! ```text
//!         ┌─► queue ─► worker ─► a.on_event(ev)
//! emit ───┤
//!         └─► queue ─► worker ─► b.on_event(ev)   (panic → SubscriberPanicked)
//! ```
//!
//! A full or closed queue loses that one event for that one subscriber and
//! publishes `SubscriberOverflow`. A panicking handler keeps its worker alive.
//! State the handler guarded with its own lock may be left half-updated.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Subscribers of one run, each behind its own queue.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            channels.push(SubscriberChannel {
                name: sub.name(),
                sender: tx,
            });
            workers.push(spawn_worker(sub, rx, bus.clone()));
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Returns the number of subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if no subscriber is attached.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Queues `event` for every subscriber without waiting.
    ///
    /// An overflow about an overflow is not published again.
    pub fn emit(&self, event: Event) {
        let is_overflow_evt = event.is_subscriber_overflow();
        let event = Arc::new(event);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Closes every queue and waits until the workers have drained them.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let fut = sub.on_event(ev.as_ref());
            if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                bus.publish(Event::subscriber_panicked(
                    sub.name(),
                    panic_message(payload.as_ref()),
                ));
            }
        }
    })
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone()], bus);
        assert_eq!(set.len(), 1);

        set.emit(Event::new(EventKind::GateOpened));
        set.emit(Event::new(EventKind::UnitStarting));
        set.emit(Event::new(EventKind::RunCompleted));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![
                EventKind::GateOpened,
                EventKind::UnitStarting,
                EventKind::RunCompleted
            ]
        );
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus);

        set.emit(Event::new(EventKind::GateOpened));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.unit.as_deref(), Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }

    #[test]
    fn panic_payloads_render_as_text() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let fixed: Box<dyn Any + Send> = Box::new("fixed");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(fixed.as_ref()), "fixed");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
