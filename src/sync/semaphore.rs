//! # Counting semaphore with a signed permit count.
//!
//! [`Semaphore`] differs from `tokio::sync::Semaphore` in the ways a teaching
//! semaphore needs to:
//!
//! - the count is signed: a negative seed means `acquire` blocks until enough
//!   releases push the count above zero;
//! - there is no upper bound, `release` may be called freely;
//! - `acquire(n)` / `release(n)` are `n` sequential single operations, other
//!   callers may interleave between them.
//!
//! ## Wake-up protocol
//! ```text
//! acquire: loop {
//!     register for wake-up (Notify::notified + enable)
//!     lock; permits > 0 ? { permits -= 1; return } : unlock
//!     wait for wake-up
//! }
//! release: lock; permits += 1; unlock; wake ALL registered waiters
//! ```
//! Registering before checking means no release is missed. Waking every waiter
//! means an abandoned wait (the waiting future dropped, e.g. because its unit was
//! aborted) never swallows a release: the remaining waiters re-check anyway.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Counting semaphore. Share it with `Arc`.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use taskgate::Semaphore;
///
/// let sem = Semaphore::new(-1);
/// sem.release_n(2);
/// sem.acquire().await;
/// assert_eq!(sem.permits(), 0);
/// # }
/// ```
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<i64>,
    released: Notify,
    waiting: AtomicUsize,
}

impl Semaphore {
    /// Creates a semaphore with the given initial number of permits.
    ///
    /// A seed of one makes it a mutual exclusion lock; negative seeds are allowed.
    pub fn new(permits: i64) -> Self {
        Self {
            permits: Mutex::new(permits),
            released: Notify::new(),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Waits until `permits > 0`, then takes one permit.
    ///
    /// Cancel-safe: dropping the future before it completes takes nothing.
    pub async fn acquire(&self) {
        let mut blocked: Option<WaitGuard<'_>> = None;
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.try_acquire() {
                return;
            }
            blocked.get_or_insert_with(|| WaitGuard::enter(&self.waiting));
            notified.await;
        }
    }

    /// Performs [`acquire`](Self::acquire) `n` times, one after another.
    pub async fn acquire_n(&self, n: usize) {
        for _ in 0..n {
            self.acquire().await;
        }
    }

    /// Takes one permit if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.lock();
        if *permits > 0 {
            *permits -= 1;
            true
        } else {
            false
        }
    }

    /// Blocks the calling OS thread in [`acquire`](Self::acquire).
    ///
    /// Meant for plain threads; do not call it from an async worker thread.
    pub fn acquire_blocking(&self) {
        futures::executor::block_on(self.acquire());
    }

    /// Blocks the calling OS thread in [`acquire_n`](Self::acquire_n).
    pub fn acquire_n_blocking(&self, n: usize) {
        futures::executor::block_on(self.acquire_n(n));
    }

    /// Adds one permit and wakes every waiter so it can re-check.
    pub fn release(&self) {
        *self.lock() += 1;
        self.released.notify_waiters();
    }

    /// Performs [`release`](Self::release) `n` times.
    pub fn release_n(&self, n: usize) {
        for _ in 0..n {
            self.release();
        }
    }

    /// Current number of permits.
    ///
    /// Accurate at the moment of reading but may change immediately after.
    pub fn permits(&self) -> i64 {
        *self.lock()
    }

    /// Number of callers currently blocked in `acquire` (a snapshot).
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, i64> {
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[permits={} waiting={}]", self.permits(), self.waiting())
    }
}

/// Counts a blocked caller for as long as it exists.
struct WaitGuard<'a>(&'a AtomicUsize);

impl<'a> WaitGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
