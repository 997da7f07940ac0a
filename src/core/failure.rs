//! # Single-fire failure latch.
//!
//! The first unit whose task fails wins the latch; everything after that is
//! the abort-all response, run exactly once:
//!
//! ```text
//! unit k fails ──► trip() ──► CAS(false → true)
//!                               ├─ lost → return false (failure ignored)
//!                               └─ won  → output.report_failure(k, error)   (silences output)
//!                                         token.cancel()                    (cooperative signal)
//!                                         abort every other unit            (non-cooperative)
//!                                         remember (k, error) for the join
//! ```
//!
//! Abort handles are installed once all units are spawned and before the gate
//! opens, so a unit can never fail before its siblings are abortable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::core::UnitId;
use crate::error::TaskError;
use crate::output::Output;
use crate::tasks::UnitInfo;

pub(crate) struct FailureLatch {
    tripped: AtomicBool,
    token: CancellationToken,
    handles: OnceLock<Vec<(UnitId, AbortHandle)>>,
    first: Mutex<Option<(String, TaskError)>>,
    output: Arc<Output>,
}

impl FailureLatch {
    pub fn new(token: CancellationToken, output: Arc<Output>) -> Self {
        Self {
            tripped: AtomicBool::new(false),
            token,
            handles: OnceLock::new(),
            first: Mutex::new(None),
            output,
        }
    }

    /// Installs the abort handles of every unit of the run.
    pub fn install(&self, handles: Vec<(UnitId, AbortHandle)>) {
        let _ = self.handles.set(handles);
    }

    /// Records `error` as the run's failure; returns true if this call won.
    pub fn trip(&self, unit: &UnitInfo, error: TaskError) -> bool {
        if self
            .tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.output.report_failure(&unit.name, &error.to_string());
        self.token.cancel();
        if let Some(handles) = self.handles.get() {
            for (id, handle) in handles {
                if *id != unit.id {
                    handle.abort();
                }
            }
        }

        *self.first.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((unit.name.to_string(), error));
        true
    }

    /// Takes the winning failure, if any.
    pub fn take_failure(&self) -> Option<(String, TaskError)> {
        self.first
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
