//! Blocking primitives usable inside and outside orchestrated runs.
//!
//! - [`Semaphore`]: counting semaphore with a signed permit count
//! - [`MutexRegistry`]: lazily created, string-keyed reentrant locks with
//!   ownership-checked release
//!
//! Both are async first (units wait without occupying a worker thread) and
//! offer `*_blocking` variants for plain OS threads.

mod mutex;
mod semaphore;

pub use mutex::{Holder, MutexRegistry};
pub use semaphore::Semaphore;
