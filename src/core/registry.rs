//! # Unit registry: identity, ordinals and naming.
//!
//! Every `create_task` call appends one [`Registration`] and gets back a
//! [`UnitId`], the unit's display ordinal (0-based, in registration order, stable
//! for the run).
//!
//! ## Naming policy
//! Units registered under the same task name form a *family*:
//! ```text
//! family size 1   → "worker"
//! family size ≥ 2 → "worker_0", "worker_1", ...
//! ```
//! So the first member keeps the bare name until a sibling appears. Names are
//! never stored; [`unit_name`] computes them from the current registry state,
//! and they are frozen when the run starts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::tasks::{TaskArgs, TaskRef, UnitInfo};

/// Display ordinal of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    pub fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    pub fn ordinal(self) -> usize {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique id of one orchestrated run.
///
/// Unit ordinals and names repeat from run to run; this id does not, so units
/// of two runs sharing a [`MutexRegistry`](crate::MutexRegistry) never pass
/// for one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub(crate) fn next() -> Self {
        Self(RUN_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Display name of member `member` of a family of `family_size` units.
///
/// ```
/// use taskgate::unit_name;
///
/// assert_eq!(unit_name("worker", 0, 1), "worker");
/// assert_eq!(unit_name("worker", 0, 2), "worker_0");
/// assert_eq!(unit_name("worker", 1, 2), "worker_1");
/// ```
pub fn unit_name(family: &str, member: usize, family_size: usize) -> String {
    if family_size <= 1 {
        family.to_string()
    } else {
        format!("{family}_{member}")
    }
}

/// One registered unit, not yet started.
pub(crate) struct Registration {
    pub family: Arc<str>,
    pub member: usize,
    pub task: TaskRef,
    pub args: TaskArgs,
}

/// A unit ready to be spawned: final identity plus what it runs.
pub(crate) struct PreparedUnit {
    pub info: UnitInfo,
    pub task: TaskRef,
    pub args: TaskArgs,
}

/// Registrations of one run, in ordinal order.
#[derive(Default)]
pub(crate) struct Registry {
    units: Vec<Registration>,
    families: HashMap<Arc<str>, usize>,
}

impl Registry {
    /// Appends a unit of `task`'s family; returns its ordinal.
    pub fn register(&mut self, task: TaskRef, args: TaskArgs) -> UnitId {
        let family: Arc<str> = Arc::from(task.name());
        let size = self.families.entry(Arc::clone(&family)).or_insert(0);
        let member = *size;
        *size += 1;

        let id = UnitId(self.units.len());
        self.units.push(Registration {
            family,
            member,
            task,
            args,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Current display name of unit `id`.
    pub fn name_of(&self, id: UnitId) -> Option<String> {
        self.units.get(id.0).map(|r| self.name(r))
    }

    /// Current display names of all units, in ordinal order.
    pub fn names(&self) -> Vec<String> {
        self.units.iter().map(|r| self.name(r)).collect()
    }

    /// Freezes names and hands the units over for spawning as part of `run`.
    pub fn into_units(self, run: RunId) -> Vec<PreparedUnit> {
        let names = self.names();
        self.units
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(ordinal, (r, name))| PreparedUnit {
                info: UnitInfo {
                    run,
                    id: UnitId(ordinal),
                    name: name.into(),
                },
                task: r.task,
                args: r.args,
            })
            .collect()
    }

    fn name(&self, r: &Registration) -> String {
        let size = self.families.get(&r.family).copied().unwrap_or(1);
        unit_name(&r.family, r.member, size)
    }
}
