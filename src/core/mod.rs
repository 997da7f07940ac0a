//! Runtime core: registration, the start gate and group lifecycle.
//!
//! The public API of this module is [`Orchestrator`] (with its builder),
//! [`Config`] and the unit naming helpers.
//!
//! Internal modules:
//! - [`registry`]: unit ordinals and the family naming rule;
//! - [`gate`]: the one-shot start gate units park on;
//! - [`unit`]: runs one unit and reports its outcome;
//! - [`failure`]: single-fire failure latch (report, cancel, abort siblings);
//! - [`listener`]: bus to subscriber fan-out for one run;
//! - [`orchestrator`]: ties the above together.

mod builder;
mod config;
mod failure;
mod gate;
mod listener;
mod orchestrator;
mod registry;
mod unit;

pub use builder::OrchestratorBuilder;
pub use config::{Config, DEFAULT_MUTEX};
pub use orchestrator::{Orchestrator, RunReport};
pub use registry::{RunId, UnitId, unit_name};
