//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for task definitions
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskTable`] - name → task map used to resolve registrations
//! - [`TaskArgs`] / [`Arg`] - arguments captured per registration
//! - [`UnitContext`] / [`UnitInfo`] - what a running unit knows about itself

mod args;
mod context;
mod table;
mod task;
mod task_fn;

pub use args::{Arg, TaskArgs};
pub use context::{UnitContext, UnitInfo, current_unit, current_unit_name};
pub(crate) use context::RunShared;
pub use table::TaskTable;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
