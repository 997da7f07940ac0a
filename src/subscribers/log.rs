//! # LogWriter: event logger
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt::init()`) to see them.
//!
//! Teaching output written by units goes to the output facility, never here, so
//! the two streams can be routed separately.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG taskgate: registered unit="worker" ordinal=0
//!  INFO taskgate: gate opened units=5
//! DEBUG taskgate: starting unit="worker_3" ordinal=3
//! ERROR taskgate: failed unit="worker_3" err="execution failed: boom"
//!  WARN taskgate: aborted unit="worker_0" ordinal=0
//! ERROR taskgate: run failed unit="worker_3" elapsed_ms=31
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let unit = e.unit.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::UnitRegistered => {
                debug!(target: "taskgate", unit, ordinal = ?e.ordinal, "registered");
            }
            EventKind::GateOpened => {
                info!(target: "taskgate", units = ?e.units, "gate opened");
            }
            EventKind::UnitStarting => {
                debug!(target: "taskgate", unit, ordinal = ?e.ordinal, "starting");
            }
            EventKind::UnitFinished => {
                debug!(target: "taskgate", unit, ordinal = ?e.ordinal, "finished");
            }
            EventKind::UnitFailed => {
                error!(target: "taskgate", unit, err = reason, "failed");
            }
            EventKind::UnitAborted => {
                warn!(target: "taskgate", unit, ordinal = ?e.ordinal, "aborted");
            }
            EventKind::RunCompleted => {
                info!(target: "taskgate", units = ?e.units, elapsed_ms = ?e.elapsed_ms, "run completed");
            }
            EventKind::RunFailed => {
                error!(target: "taskgate", unit, err = reason, elapsed_ms = ?e.elapsed_ms, "run failed");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "taskgate", subscriber = unit, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "taskgate", subscriber = unit, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
