//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the orchestrator and its units.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator` (registration, gate, terminal events), unit
//!   runners (start/finish/failure), the failure latch (aborts) and
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the orchestrator's listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
