//! # Run one execution unit.
//!
//! A unit is spawned while the gate is still closed. Once released it pauses
//! for its start delay, runs its task body once inside its task-local identity,
//! and reports the outcome.
//!
//! ## Event flow
//! ```text
//! gate.wait() → [start delay] → UnitStarting → task.spawn(ctx)
//!                                                ├─ Ok(())          → UnitFinished
//!                                                ├─ Err(e)          → UnitFailed → latch.trip(e)
//!                                                └─ panic           → UnitFailed → latch.trip(Panicked)
//! ```
//!
//! An aborted unit publishes nothing itself; the orchestrator reports it as
//! `UnitAborted` after the join.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::UnitId;
use crate::core::failure::FailureLatch;
use crate::core::gate::GateWaiter;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;
use crate::tasks::{RunShared, TaskArgs, TaskRef, UnitContext, UnitInfo};

/// How a unit that was not aborted ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnitOutcome {
    /// The task returned `Ok`.
    Finished,
    /// The task returned an error or panicked.
    Failed,
    /// The gate was dropped before opening; the task never ran.
    NotStarted,
}

#[derive(Debug)]
pub(crate) struct UnitExit {
    pub id: UnitId,
    pub outcome: UnitOutcome,
}

pub(crate) struct UnitRunner {
    pub info: UnitInfo,
    pub task: TaskRef,
    pub args: TaskArgs,
    pub gate: GateWaiter,
    pub token: CancellationToken,
    pub shared: Arc<RunShared>,
    pub latch: Arc<FailureLatch>,
    pub bus: Bus,
}

impl UnitRunner {
    /// Runs the unit to completion with its identity installed.
    pub async fn run(self) -> UnitExit {
        let id = self.info.id;
        let outcome = self.info.clone().scope(self.drive()).await;
        UnitExit { id, outcome }
    }

    async fn drive(mut self) -> UnitOutcome {
        if !self.gate.wait().await {
            return UnitOutcome::NotStarted;
        }
        crate::time::sleep(self.shared.cfg.next_start_delay()).await;

        self.publish(EventKind::UnitStarting, None);
        let ctx = UnitContext::new(
            self.info.clone(),
            self.args.clone(),
            self.token.clone(),
            Arc::clone(&self.shared),
        );
        let task = Arc::clone(&self.task);
        let res = AssertUnwindSafe(async move { task.spawn(ctx).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(TaskError::Panicked {
                    info: panic_message(payload.as_ref()),
                })
            });

        match res {
            Ok(()) => {
                self.publish(EventKind::UnitFinished, None);
                UnitOutcome::Finished
            }
            Err(e) => {
                self.publish(EventKind::UnitFailed, Some(e.to_string()));
                self.latch.trip(&self.info, e);
                UnitOutcome::Failed
            }
        }
    }

    fn publish(&self, kind: EventKind, reason: Option<String>) {
        let mut ev = Event::new(kind)
            .with_unit(Arc::clone(&self.info.name))
            .with_ordinal(self.info.ordinal());
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        self.bus.publish(ev);
    }
}
