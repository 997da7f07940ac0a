//! Error types used by the taskgate runtime, task bodies and the sync primitives.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: errors raised by the orchestrator itself (configuration
//!   problems and whole-group failures).
//! - [`TaskError`]: errors raised by individual task bodies.
//! - [`MutexError`]: usage errors of the named mutex registry.
//!
//! All of them provide `as_label` (stable snake_case, for logs) and `as_message`.

use thiserror::Error;

/// # Errors produced by the orchestrator.
///
/// `TaskNotFound` is a configuration error and is always reported before any
/// unit starts. `TaskFailed` means the whole group was aborted because one unit
/// failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No task with this name was defined before registration.
    #[error("task \"{name}\" not found")]
    TaskNotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// A unit failed; all other units were aborted.
    #[error("exception in unit [{unit}]: {error}")]
    TaskFailed {
        /// Display name of the unit that failed first.
        unit: String,
        /// The error raised by its task body.
        error: TaskError,
    },

    /// The blocking entry point could not build its tokio runtime.
    #[error("failed to build runtime: {0}")]
    RuntimeBuild(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskgate::RuntimeError;
    ///
    /// let err = RuntimeError::TaskNotFound { name: "worker".into() };
    /// assert_eq!(err.as_label(), "runtime_task_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::TaskNotFound { .. } => "runtime_task_not_found",
            RuntimeError::TaskFailed { .. } => "runtime_task_failed",
            RuntimeError::RuntimeBuild(_) => "runtime_build_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::TaskNotFound { name } => format!("no task defined under name {name:?}"),
            RuntimeError::TaskFailed { unit, error } => {
                format!("unit {unit} failed: {}", error.as_message())
            }
            RuntimeError::RuntimeBuild(e) => format!("runtime build: {e}"),
        }
    }

    /// Returns the display name of the failed unit, if this is a group failure.
    pub fn failed_unit(&self) -> Option<&str> {
        match self {
            RuntimeError::TaskFailed { unit, .. } => Some(unit),
            _ => None,
        }
    }
}

/// # Errors produced by task bodies.
///
/// Any error escaping a task body fails the whole group.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task body failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A captured argument was missing or had another type.
    #[error("argument #{index} is not a {expected}")]
    Arg {
        /// Position of the argument.
        index: usize,
        /// Expected type name.
        expected: &'static str,
    },

    /// The named mutex registry was misused.
    #[error(transparent)]
    Mutex(#[from] MutexError),

    /// Task body panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Task observed the run's cancellation and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Convenience constructor for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Arg { .. } => "task_bad_argument",
            TaskError::Mutex(e) => e.as_label(),
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Arg { index, expected } => {
                format!("argument #{index}: expected {expected}")
            }
            TaskError::Mutex(e) => e.as_message(),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Usage errors of the named mutex registry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutexError {
    /// `exit` was called for an id that was never entered.
    #[error("mutex \"{mutex}\" does not exist")]
    DoesNotExist {
        /// The mutex id.
        mutex: String,
    },

    /// `exit` was called by someone other than the current holder.
    #[error(
        "\"{holder}\" is trying to exit mutex \"{mutex}\" but another unit is in the critical section"
    )]
    NotOwner {
        /// The offending caller.
        holder: String,
        /// The mutex id.
        mutex: String,
    },
}

impl MutexError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            MutexError::DoesNotExist { .. } => "mutex_does_not_exist",
            MutexError::NotOwner { .. } => "mutex_not_owner",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            MutexError::DoesNotExist { mutex } => format!("mutex={mutex:?} does not exist"),
            MutexError::NotOwner { holder, mutex } => {
                format!("mutex={mutex:?} exited by non-owner {holder}")
            }
        }
    }
}
