//! # taskgate
//!
//! **taskgate** runs a group of concurrent units of work the way a classroom
//! demo needs them to run: register named tasks, release them all at once
//! through a one-shot start gate, wait for every one of them, and abort the
//! whole group the moment any unit fails.
//!
//! Next to the orchestrator it provides the two primitives such demos are
//! about: a registry of named, ownership-checked mutexes and a counting
//! semaphore. Both also work outside orchestrated runs.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     define("worker", f)      create_tasks(3, "worker", args![..])
//!              │                          │
//!              ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - TaskTable (name → task)                                        │
//! │  - Registry (ordinals, worker / worker_0..worker_N naming)        │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► LogWriter, ...    │
//! │  - Output (indented, jittered, silenced after a failure)          │
//! │  - MutexRegistry (named reentrant locks)                          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ worker_0 │       │ worker_1 │       │ worker_2 │   parked on the StartGate
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        └────────── gate.open() ──────────────┘
//!                           ▼
//!          units run; each may enter/exit mutexes,
//!          acquire/release semaphores, print indented
//!                           ▼
//!        ┌─ all Ok  → "Concurrent code took N millis"  → Ok(RunReport)
//!        └─ one Err → FailureLatch: report once, cancel, abort siblings
//!                                                      → Err(TaskFailed)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Orchestration** | Gated start, join, abort-all on failure.                      | [`Orchestrator`], [`RunReport`]            |
//! | **Tasks**         | Define tasks as closures, pass typed arguments.               | [`TaskFn`], [`TaskRef`], [`TaskArgs`]      |
//! | **Mutexes**       | Named reentrant locks with ownership-checked exit.            | [`MutexRegistry`], [`Holder`]              |
//! | **Semaphore**     | Counting semaphore, signed initial permits.                   | [`Semaphore`]                              |
//! | **Output**        | Per-unit indented console output with random pauses.          | [`Output`], [`Sink`]                       |
//! | **Subscriber API**| Hook into unit lifecycle events (logging, custom subscribers).| [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed errors for orchestration, task bodies and mutex misuse. | [`RuntimeError`], [`TaskError`], [`MutexError`] |
//! | **Configuration** | Delays, jitter, indent width, default mutex id.               | [`Config`], [`JitterPolicy`]               |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber, which
//!   renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskgate::{Config, Orchestrator, Subscribe, TaskError, UnitContext, args};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(taskgate::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let mut orch = Orchestrator::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     orch.define_fn("counter", |ctx: UnitContext| async move {
//!         let upto = ctx.args().int(0)?;
//!         for i in 1..=upto {
//!             ctx.enter_mutex().await;
//!             ctx.println_indented(&format!("{}: {i}", ctx.name())).await;
//!             ctx.exit_mutex()?;
//!         }
//!         Ok::<_, TaskError>(())
//!     });
//!     orch.create_tasks(3, "counter", args![3])?;
//!
//!     let report = orch.start_and_wait_all().await?;
//!     assert_eq!(report.units.len(), 3);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod output;
mod policies;
mod subscribers;
mod sync;
mod tasks;
mod time;

// ---- Public re-exports ----

pub use core::{Config, DEFAULT_MUTEX, Orchestrator, OrchestratorBuilder, RunReport, RunId, UnitId, unit_name};
pub use error::{MutexError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use output::{Capture, Output, Sink};
pub use policies::JitterPolicy;
pub use subscribers::{Subscribe, SubscriberSet};
pub use sync::{Holder, MutexRegistry, Semaphore};
pub use tasks::{
    Arg, BoxTaskFuture, Task, TaskArgs, TaskFn, TaskRef, TaskTable, UnitContext, UnitInfo,
    current_unit, current_unit_name,
};
pub use time::{sleep, sleep_random};

// Optional: expose a simple built-in logger subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
