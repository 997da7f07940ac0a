//! # Task abstraction.
//!
//! This module defines the [`Task`] trait and the shared handle type [`TaskRef`].
//!
//! A task is the *definition* of work. The orchestrator turns each registration of a
//! task into one execution unit, and calls [`Task::spawn`] once per unit with that
//! unit's [`UnitContext`] (its identity, captured arguments and run handles).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::UnitContext;

/// Future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared reference to a task definition.
pub type TaskRef = Arc<dyn Task>;

/// # Named, spawnable unit of work.
///
/// A `Task` has a stable [`name`](Task::name), which is also the family name of
/// every unit registered for it, and produces a fresh future per unit.
///
/// # Example
/// ```
/// use taskgate::{BoxTaskFuture, Task, UnitContext};
///
/// struct Greeter;
///
/// impl Task for Greeter {
///     fn name(&self) -> &str { "greeter" }
///
///     fn spawn(&self, ctx: UnitContext) -> BoxTaskFuture {
///         Box::pin(async move {
///             ctx.println(&format!("hello from {}", ctx.name())).await;
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns the task (family) name.
    fn name(&self) -> &str;

    /// Creates the future executed by one unit.
    ///
    /// Any `Err` (or panic) escaping the future fails the whole run.
    fn spawn(&self, ctx: UnitContext) -> BoxTaskFuture;
}
