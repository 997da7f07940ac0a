//! # Unit identity and execution context.
//!
//! Every running unit carries two views of itself:
//!
//! - an explicit [`UnitContext`] handed to its task (identity, arguments,
//!   cancellation, and handles to the run's output facility and mutex registry);
//! - an implicit task-local [`UnitInfo`], so code deep inside the unit can ask
//!   "who am I" through [`current_unit`] / [`current_unit_name`] without threading
//!   parameters through. The output facility and the mutex registry rely on it.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::core::{Config, RunId, UnitId};
use crate::error::MutexError;
use crate::output::Output;
use crate::sync::MutexRegistry;
use crate::tasks::TaskArgs;

tokio::task_local! {
    static CURRENT_UNIT: UnitInfo;
}

/// Identity of one execution unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitInfo {
    /// Run the unit belongs to.
    pub run: RunId,
    /// Display ordinal (position among all units of the run).
    pub id: UnitId,
    /// Display name (`family` or `family_k`).
    pub name: Arc<str>,
}

impl UnitInfo {
    pub fn ordinal(&self) -> usize {
        self.id.ordinal()
    }

    /// Runs `fut` with `self` installed as the current unit.
    pub(crate) async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT_UNIT.scope(self, fut).await
    }
}

/// Returns the identity of the calling unit, or `None` outside any unit.
pub fn current_unit() -> Option<UnitInfo> {
    CURRENT_UNIT.try_with(Clone::clone).ok()
}

/// Returns the display name of the calling unit, or `None` outside any unit.
///
/// ```rust
/// assert_eq!(taskgate::current_unit_name(), None);
/// ```
pub fn current_unit_name() -> Option<String> {
    CURRENT_UNIT.try_with(|u| u.name.to_string()).ok()
}

/// Run-wide handles shared by every unit.
pub(crate) struct RunShared {
    pub cfg: Arc<Config>,
    pub output: Arc<Output>,
    pub mutexes: Arc<MutexRegistry>,
    pub units: usize,
}

/// Everything a unit's task gets to work with.
///
/// Cheap to clone; clones refer to the same unit.
#[derive(Clone)]
pub struct UnitContext {
    info: UnitInfo,
    args: TaskArgs,
    token: CancellationToken,
    shared: Arc<RunShared>,
}

impl UnitContext {
    pub(crate) fn new(
        info: UnitInfo,
        args: TaskArgs,
        token: CancellationToken,
        shared: Arc<RunShared>,
    ) -> Self {
        Self {
            info,
            args,
            token,
            shared,
        }
    }

    /// Display name of this unit.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn id(&self) -> UnitId {
        self.info.id
    }

    /// Display ordinal of this unit.
    pub fn ordinal(&self) -> usize {
        self.info.ordinal()
    }

    pub fn info(&self) -> &UnitInfo {
        &self.info
    }

    /// Arguments captured at registration.
    pub fn args(&self) -> &TaskArgs {
        &self.args
    }

    /// Number of units in the run.
    pub fn unit_count(&self) -> usize {
        self.shared.units
    }

    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// True once a sibling failed and the run is being torn down.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the run is being torn down.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn output(&self) -> &Arc<Output> {
        &self.shared.output
    }

    pub fn mutexes(&self) -> &Arc<MutexRegistry> {
        &self.shared.mutexes
    }

    /// Enters the default mutex.
    pub async fn enter_mutex(&self) {
        self.shared.mutexes.enter_default().await;
    }

    /// Enters the mutex `id`, creating it on first use.
    pub async fn enter_mutex_named(&self, id: &str) {
        self.shared.mutexes.enter(id).await;
    }

    /// Exits the default mutex.
    pub fn exit_mutex(&self) -> Result<(), MutexError> {
        self.shared.mutexes.exit_default()
    }

    /// Exits the mutex `id`.
    pub fn exit_mutex_named(&self, id: &str) -> Result<(), MutexError> {
        self.shared.mutexes.exit(id)
    }

    pub async fn print(&self, text: &str) {
        self.shared.output.print(text).await;
    }

    pub async fn println(&self, text: &str) {
        self.shared.output.println(text).await;
    }

    /// Prints `text` indented by this unit's ordinal.
    pub async fn print_indented(&self, text: &str) {
        self.shared.output.print_indented(text).await;
    }

    /// Prints `text` on its own line, indented by this unit's ordinal.
    pub async fn println_indented(&self, text: &str) {
        self.shared.output.println_indented(text).await;
    }

    pub async fn sleep(&self, duration: Duration) {
        crate::time::sleep(duration).await;
    }

    /// Sleeps a random duration in [0, max].
    pub async fn sleep_random(&self, max: Duration) {
        crate::time::sleep_random(max).await;
    }
}

impl std::fmt::Debug for UnitContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitContext")
            .field("name", &self.info.name)
            .field("ordinal", &self.info.ordinal())
            .field("args", &self.args)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
