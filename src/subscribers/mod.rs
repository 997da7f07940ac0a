//! # Event subscribers for the taskgate runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Unit ── publish(Event) ──► Bus ──► Orchestrator listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                         ┌────────┼─────────┐
//!                                                         ▼        ▼         ▼
//!                                                     LogWriter  Recorder  Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use taskgate::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::UnitFailed {
//!             // count it
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;
