//! # Orchestrator: register units, open the gate, join, abort-all on failure.
//!
//! The [`Orchestrator`] owns everything a run needs: the task table, the unit
//! registry, the event bus, the output facility and the mutex registry.
//!
//! ## Lifecycle
//! ```text
//! Registering ──(start_and_wait_all)──► Released ──► Running ──► Joined
//!   define()                              gate open    units run    elapsed / failure
//!   create_task()
//! ```
//! Registration takes `&mut self` and starting consumes `self`, so no unit can
//! be added once the gate has opened.
//!
//! ## Run flow
//! ```text
//! start_and_wait_all():
//!   listener: Bus ──► SubscriberSet                     (fan-out, drained at the end)
//!   spawn unit 0..N-1 into a JoinSet                    (each parks on the gate)
//!   latch.install(abort handles)
//!   started_at = now; gate.open(); publish GateOpened
//!   join all:
//!     ├─ unit returns normally        → UnitFinished (published by the unit)
//!     ├─ unit fails / panics          → UnitFailed + latch.trip()
//!     │                                    └─ winner: report, cancel, abort siblings
//!     └─ unit aborted                 → UnitAborted (published here)
//!   force-release mutexes held by units that did not finish normally
//!   ├─ failure recorded → RunFailed,    Err(TaskFailed { unit, error })
//!   └─ otherwise        → "Concurrent code took N millis", RunCompleted, Ok(RunReport)
//! ```
//!
//! ## Example
//! ```rust
//! use taskgate::{Config, Orchestrator, TaskError, UnitContext, args};
//!
//! # #[tokio::main(flavor = "multi_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut orch = Orchestrator::builder(Config::quiet()).build();
//! orch.define_fn("worker", |ctx: UnitContext| async move {
//!     let rounds = ctx.args().int(0)?;
//!     for i in 0..rounds {
//!         ctx.println_indented(&format!("{}: {i}", ctx.name())).await;
//!     }
//!     Ok::<_, TaskError>(())
//! });
//! orch.create_tasks(3, "worker", args![2])?;
//!
//! let report = orch.start_and_wait_all().await?;
//! assert_eq!(report.units, ["worker_0", "worker_1", "worker_2"]);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::builder::OrchestratorBuilder;
use crate::core::failure::FailureLatch;
use crate::core::gate::StartGate;
use crate::core::listener::EventListener;
use crate::core::registry::Registry;
use crate::core::unit::{UnitOutcome, UnitRunner};
use crate::core::{Config, RunId, UnitId};
use crate::error::{RuntimeError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::output::Output;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::sync::{Holder, MutexRegistry};
use crate::tasks::{RunShared, TaskArgs, TaskFn, TaskRef, TaskTable, UnitContext};

/// Summary of a run in which every unit finished normally.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Wall-clock time from the gate opening to the last unit finishing.
    pub elapsed: Duration,
    /// When the gate opened.
    pub started_at: Instant,
    /// Display names of all units, in ordinal order.
    pub units: Vec<String>,
}

/// Registers units and runs them as one group.
pub struct Orchestrator {
    cfg: Arc<Config>,
    bus: Bus,
    events: broadcast::Receiver<Event>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    table: TaskTable,
    registry: Registry,
    output: Arc<Output>,
    mutexes: Arc<MutexRegistry>,
}

impl Orchestrator {
    /// Orchestrator with default configuration, no subscribers and stdout output.
    pub fn new() -> Self {
        OrchestratorBuilder::new(Config::default()).build()
    }

    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
        output: Arc<Output>,
        mutexes: Arc<MutexRegistry>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let events = bus.subscribe();
        Self {
            cfg: Arc::new(cfg),
            bus,
            events,
            subscribers,
            table: TaskTable::new(),
            registry: Registry::default(),
            output,
            mutexes,
        }
    }

    /// Defines `task` under its own name; returns the definition it replaced.
    pub fn define(&mut self, task: TaskRef) -> Option<TaskRef> {
        self.table.define(task)
    }

    /// Defines a closure-backed task named `name`.
    pub fn define_fn<F, Fut>(&mut self, name: &'static str, f: F) -> Option<TaskRef>
    where
        F: Fn(UnitContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.define(TaskFn::arc(name, f))
    }

    /// Registers one unit of task `name` with `args`.
    ///
    /// Fails with [`RuntimeError::TaskNotFound`] if no such task was defined;
    /// nothing is registered in that case.
    pub fn create_task(
        &mut self,
        name: &str,
        args: impl Into<TaskArgs>,
    ) -> Result<UnitId, RuntimeError> {
        let task = self.table.resolve(name)?;
        let id = self.registry.register(task, args.into());
        self.bus.publish(
            Event::new(EventKind::UnitRegistered)
                .with_unit(name)
                .with_ordinal(id.ordinal()),
        );
        Ok(id)
    }

    /// Registers `count` units of task `name`, all with the same `args`.
    pub fn create_tasks(
        &mut self,
        count: usize,
        name: &str,
        args: impl Into<TaskArgs>,
    ) -> Result<Vec<UnitId>, RuntimeError> {
        let task = self.table.resolve(name)?;
        let args = args.into();
        let ids = (0..count)
            .map(|_| {
                let id = self.registry.register(Arc::clone(&task), args.clone());
                self.bus.publish(
                    Event::new(EventKind::UnitRegistered)
                        .with_unit(name)
                        .with_ordinal(id.ordinal()),
                );
                id
            })
            .collect();
        Ok(ids)
    }

    /// Current display name of unit `id`.
    ///
    /// May change while more units of the same task are registered.
    pub fn unit_name(&self, id: UnitId) -> Option<String> {
        self.registry.name_of(id)
    }

    /// Current display names of all registered units.
    pub fn unit_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn output(&self) -> &Arc<Output> {
        &self.output
    }

    pub fn mutexes(&self) -> &Arc<MutexRegistry> {
        &self.mutexes
    }

    /// Subscribes to runtime events directly.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Opens the gate, waits for every unit to terminate and reports the outcome.
    ///
    /// Returns [`RuntimeError::TaskFailed`] naming the first unit that failed;
    /// every other unit was aborted by then.
    ///
    /// # Panics
    /// Re-raises a panic of the orchestrator's own unit wrapper. Panics in task
    /// bodies are reported as [`TaskError::Panicked`] instead.
    pub async fn start_and_wait_all(self) -> Result<RunReport, RuntimeError> {
        let Orchestrator {
            cfg,
            bus,
            events,
            subscribers,
            registry,
            output,
            mutexes,
            ..
        } = self;

        let listener = EventListener::spawn(events, SubscriberSet::new(subscribers, bus.clone()));

        let units = registry.into_units(RunId::next());
        let infos: Vec<_> = units.iter().map(|u| u.info.clone()).collect();
        let token = CancellationToken::new();
        let latch = Arc::new(FailureLatch::new(token.clone(), Arc::clone(&output)));
        let shared = Arc::new(RunShared {
            cfg,
            output: Arc::clone(&output),
            mutexes: Arc::clone(&mutexes),
            units: units.len(),
        });

        let gate = StartGate::new();
        let mut set = JoinSet::new();
        let mut handles = Vec::with_capacity(units.len());
        for unit in units {
            let id = unit.info.id;
            let runner = UnitRunner {
                info: unit.info,
                task: unit.task,
                args: unit.args,
                gate: gate.waiter(),
                token: token.clone(),
                shared: Arc::clone(&shared),
                latch: Arc::clone(&latch),
                bus: bus.clone(),
            };
            handles.push((id, set.spawn(runner.run())));
        }
        latch.install(handles);

        let started_at = Instant::now();
        gate.open();
        bus.publish(Event::new(EventKind::GateOpened).with_units(infos.len()));

        let mut outcomes: Vec<Option<UnitOutcome>> = vec![None; infos.len()];
        while let Some(res) = set.join_next().await {
            match res {
                Ok(exit) => outcomes[exit.id.ordinal()] = Some(exit.outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => {}
            }
        }
        let elapsed = started_at.elapsed();

        for (info, outcome) in infos.iter().zip(&outcomes) {
            if outcome.is_none() {
                bus.publish(
                    Event::new(EventKind::UnitAborted)
                        .with_unit(Arc::clone(&info.name))
                        .with_ordinal(info.ordinal()),
                );
            }
            if *outcome != Some(UnitOutcome::Finished) {
                mutexes.release_held_by(&Holder::from(info));
            }
        }

        let result = match latch.take_failure() {
            Some((unit, error)) => {
                bus.publish(
                    Event::new(EventKind::RunFailed)
                        .with_unit(unit.as_str())
                        .with_reason(error.to_string())
                        .with_elapsed(elapsed),
                );
                Err(RuntimeError::TaskFailed { unit, error })
            }
            None => {
                output.report_elapsed(elapsed);
                bus.publish(
                    Event::new(EventKind::RunCompleted)
                        .with_units(infos.len())
                        .with_elapsed(elapsed),
                );
                Ok(RunReport {
                    elapsed,
                    started_at,
                    units: infos.iter().map(|u| u.name.to_string()).collect(),
                })
            }
        };

        listener.finish().await;
        result
    }

    /// Runs [`start_and_wait_all`](Self::start_and_wait_all) on a fresh
    /// multi-threaded runtime, blocking the calling thread.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn start_and_wait_all_blocking(self) -> Result<RunReport, RuntimeError> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()?;
        rt.block_on(self.start_and_wait_all())
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
