//! # Named mutex registry.
//!
//! [`MutexRegistry`] maps application-chosen ids to reentrant locks that are
//! created on first use and never removed. Unlike a guard-based mutex, entering
//! and exiting are separate calls, so the registry tracks *who* holds each lock
//! and rejects an exit by anyone else.
//!
//! ## Rules
//! - First use of an id creates its lock exactly once, even under concurrent first use.
//! - `enter` is reentrant for the same [`Holder`]; each `enter` needs one `exit`.
//! - `exit` on an unknown id fails with [`MutexError::DoesNotExist`].
//! - `exit` by a non-holder fails with [`MutexError::NotOwner`] naming the caller.
//!
//! ## Holder identity
//! ```text
//! inside an orchestrated unit  → Holder::Unit   (run id + ordinal + display name)
//! inside any other tokio task  → Holder::Task   (tokio task id)
//! anywhere else                → Holder::Thread (calling OS thread)
//! ```
//! A task keeps its identity when the runtime moves it between worker threads.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use tokio::sync::Notify;

use crate::core::{DEFAULT_MUTEX, RunId, UnitId};
use crate::error::MutexError;
use crate::tasks::{UnitInfo, current_unit};

/// Whoever currently holds a named lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Holder {
    /// An orchestrated unit.
    Unit {
        run: RunId,
        id: UnitId,
        name: Arc<str>,
    },
    /// A tokio task outside any unit.
    Task { id: tokio::task::Id },
    /// A thread outside any task.
    Thread { id: ThreadId, name: Option<String> },
}

impl Holder {
    /// Identifies the caller: the current unit, else the current tokio task,
    /// else the current thread.
    pub fn current() -> Self {
        if let Some(unit) = current_unit() {
            return Self::from(&unit);
        }
        if let Some(id) = tokio::task::try_id() {
            return Holder::Task { id };
        }
        let t = thread::current();
        Holder::Thread {
            id: t.id(),
            name: t.name().map(str::to_string),
        }
    }
}

impl From<&UnitInfo> for Holder {
    fn from(unit: &UnitInfo) -> Self {
        Holder::Unit {
            run: unit.run,
            id: unit.id,
            name: Arc::clone(&unit.name),
        }
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Unit { name, .. } => f.write_str(name),
            Holder::Task { id } => write!(f, "task {id}"),
            Holder::Thread { name: Some(name), .. } => f.write_str(name),
            Holder::Thread { id, name: None } => write!(f, "{id:?}"),
        }
    }
}

#[derive(Default)]
struct LockState {
    holder: Option<Holder>,
    depth: usize,
}

/// One reentrant lock with an explicit owner.
#[derive(Default)]
struct NamedLock {
    state: Mutex<LockState>,
    released: Notify,
}

impl NamedLock {
    async fn acquire(&self, who: Holder) {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.lock();
                let free_or_ours = st.holder.as_ref().is_none_or(|current| *current == who);
                if free_or_ours {
                    if st.holder.is_none() {
                        st.holder = Some(who);
                    }
                    st.depth += 1;
                    return;
                }
            }
            notified.await;
        }
    }

    fn release(&self, who: &Holder, mutex: &str) -> Result<(), MutexError> {
        let mut st = self.lock();
        if st.holder.as_ref() != Some(who) {
            return Err(MutexError::NotOwner {
                holder: who.to_string(),
                mutex: mutex.to_string(),
            });
        }
        st.depth -= 1;
        if st.depth == 0 {
            st.holder = None;
            drop(st);
            self.released.notify_waiters();
        }
        Ok(())
    }

    /// Drops every level held by `who`; returns true if anything was released.
    fn force_release(&self, who: &Holder) -> bool {
        let mut st = self.lock();
        if st.holder.as_ref() != Some(who) {
            return false;
        }
        st.holder = None;
        st.depth = 0;
        drop(st);
        self.released.notify_waiters();
        true
    }

    fn lock(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of lazily created, string-keyed reentrant locks.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use taskgate::{MutexError, MutexRegistry};
///
/// let mutexes = MutexRegistry::default();
/// assert!(matches!(mutexes.exit("x"), Err(MutexError::DoesNotExist { .. })));
///
/// mutexes.enter("x").await;
/// mutexes.enter("x").await; // reentrant
/// mutexes.exit("x").unwrap();
/// mutexes.exit("x").unwrap();
/// assert!(mutexes.holder("x").is_none());
/// # }
/// ```
pub struct MutexRegistry {
    locks: DashMap<String, Arc<NamedLock>>,
    default_id: String,
}

impl MutexRegistry {
    /// Creates an empty registry whose default mutex is `default_id`.
    pub fn new(default_id: impl Into<String>) -> Self {
        Self {
            locks: DashMap::new(),
            default_id: default_id.into(),
        }
    }

    /// Id used by [`enter_default`](Self::enter_default) / [`exit_default`](Self::exit_default).
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Waits until the caller holds mutex `id`, creating it on first use.
    pub async fn enter(&self, id: &str) {
        let who = Holder::current();
        self.lock_for(id).acquire(who).await;
    }

    /// Blocks the calling OS thread in [`enter`](Self::enter).
    pub fn enter_blocking(&self, id: &str) {
        futures::executor::block_on(self.enter(id));
    }

    /// Releases one level of mutex `id` held by the caller.
    pub fn exit(&self, id: &str) -> Result<(), MutexError> {
        let lock = self
            .locks
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MutexError::DoesNotExist {
                mutex: id.to_string(),
            })?;
        lock.release(&Holder::current(), id)
    }

    pub async fn enter_default(&self) {
        let who = Holder::current();
        self.lock_for(&self.default_id).acquire(who).await;
    }

    pub fn exit_default(&self) -> Result<(), MutexError> {
        self.exit(&self.default_id)
    }

    /// Current holder of mutex `id` (a snapshot).
    pub fn holder(&self, id: &str) -> Option<Holder> {
        let lock = self.locks.get(id).map(|entry| Arc::clone(entry.value()))?;
        let st = lock.lock();
        st.holder.clone()
    }

    /// Force-releases every mutex held by `who`; returns the ids released.
    ///
    /// Used when a unit is terminated while inside critical sections.
    pub fn release_held_by(&self, who: &Holder) -> Vec<String> {
        let locks: Vec<(String, Arc<NamedLock>)> = self
            .locks
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut released: Vec<String> = locks
            .into_iter()
            .filter(|(_, lock)| lock.force_release(who))
            .map(|(id, _)| id)
            .collect();
        released.sort_unstable();
        released
    }

    /// Number of mutexes created so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn lock_for(&self, id: &str) -> Arc<NamedLock> {
        if let Some(lock) = self.locks.get(id) {
            return Arc::clone(lock.value());
        }
        Arc::clone(self.locks.entry(id.to_string()).or_default().value())
    }
}

impl Default for MutexRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MUTEX)
    }
}

impl fmt::Debug for MutexRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexRegistry")
            .field("mutexes", &self.locks.len())
            .field("default_id", &self.default_id)
            .finish()
    }
}
