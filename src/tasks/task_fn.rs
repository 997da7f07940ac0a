//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(UnitContext) -> Fut`, producing a fresh
//! future per unit. Units registered for the same task never share hidden state;
//! if they need shared state, capture an `Arc<...>` explicitly in the closure.
//!
//! ## Example
//! ```rust
//! use taskgate::{TaskFn, TaskRef, TaskError, UnitContext};
//!
//! let t: TaskRef = TaskFn::arc("worker", |ctx: UnitContext| async move {
//!     let rounds = ctx.args().int(0)?;
//!     for i in 0..rounds {
//!         ctx.println_indented(&format!("round {i}")).await;
//!     }
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};
use crate::tasks::UnitContext;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per unit.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(UnitContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: UnitContext) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}
