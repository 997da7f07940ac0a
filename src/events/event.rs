//! # Runtime events.
//!
//! Every step of a run is published as an [`Event`]: units being registered,
//! the gate opening, each unit starting and ending, and the run's outcome.
//! Subscriber trouble (a full queue, a panicking handler) is published on the
//! same bus. Fields not relevant to a kind stay `None`.
//!
//! `seq` comes from one process-wide counter, so sorting by it recovers
//! publication order across units.
//!
//! ## Example
//! ```rust
//! use taskgate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::UnitFailed)
//!     .with_unit("worker_3")
//!     .with_ordinal(3)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::UnitFailed);
//! assert_eq!(ev.unit.as_deref(), Some("worker_3"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `unit`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `unit`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Registration ===
    /// A unit was registered (gate still closed).
    ///
    /// Sets:
    /// - `unit`: task family name (the final display name is known at release)
    /// - `ordinal`: display ordinal
    UnitRegistered,

    // === Lifecycle ===
    /// The start gate opened; every unit may now run.
    ///
    /// Sets:
    /// - `units`: number of units released
    GateOpened,

    /// A unit woke up and is about to run its task.
    ///
    /// Sets:
    /// - `unit`: display name
    /// - `ordinal`: display ordinal
    UnitStarting,

    /// A unit's task returned `Ok`.
    ///
    /// Sets:
    /// - `unit`, `ordinal`
    UnitFinished,

    /// A unit's task returned an error or panicked.
    ///
    /// Sets:
    /// - `unit`, `ordinal`
    /// - `reason`: error message
    UnitFailed,

    /// A unit was aborted because a sibling failed.
    ///
    /// Sets:
    /// - `unit`, `ordinal`
    UnitAborted,

    // === Terminal ===
    /// Every unit finished normally.
    ///
    /// Sets:
    /// - `units`: number of units
    /// - `elapsed_ms`: wall-clock time since the gate opened
    RunCompleted,

    /// The run was aborted after a unit failure.
    ///
    /// Sets:
    /// - `unit`: the failing unit
    /// - `reason`: its error message
    /// - `elapsed_ms`: wall-clock time since the gate opened
    RunFailed,
}

/// One published event. Which optional fields are set depends on `kind`.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Unit (or subscriber) name, if applicable.
    pub unit: Option<Arc<str>>,
    /// Display ordinal of the unit.
    pub ordinal: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Elapsed wall-clock time in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Number of units involved.
    pub units: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            unit: None,
            ordinal: None,
            reason: None,
            elapsed_ms: None,
            units: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a unit name.
    #[inline]
    pub fn with_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches a display ordinal.
    #[inline]
    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a unit count.
    #[inline]
    pub fn with_units(mut self, n: usize) -> Self {
        self.units = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_unit(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_unit(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Returns true for events that end a run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::RunCompleted | EventKind::RunFailed)
    }
}
