//! # Event subscriber trait.
//!
//! [`Subscribe`] is how code outside the units watches a run: registrations,
//! the gate opening, units starting, finishing, failing or being aborted.
//!
//! Every subscriber is served by its own worker task reading its own bounded
//! queue (see [`Subscribe::queue_capacity`]). Units publish and move on; they
//! never wait for a subscriber. A full queue drops the event for that
//! subscriber and publishes `SubscriberOverflow`; a panic inside `on_event` is
//! caught and published as `SubscriberPanicked`.
//!
//! Events reach one subscriber in publication order, and all of them are
//! delivered before [`Orchestrator::start_and_wait_all`](crate::Orchestrator::start_and_wait_all)
//! returns.

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime events.
///
/// `on_event` runs on the subscriber's worker, so slow handlers only delay
/// their own queue. Keep it non-blocking all the same.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
