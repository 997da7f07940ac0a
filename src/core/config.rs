//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for one orchestration run.
//!
//! Config is consumed by [`OrchestratorBuilder`](crate::OrchestratorBuilder) and shared
//! (read-only) with every unit, the output facility and the mutex registry.
//!
//! ## Sentinel values
//! - `start_delay = 0s` → units start right after the gate opens
//! - `print_delay = 0s` → output is written without artificial pauses

use std::time::Duration;

use crate::policies::JitterPolicy;

/// Default mutex id used when the caller does not name one.
pub const DEFAULT_MUTEX: &str = "default";

/// Global configuration for an orchestration run.
///
/// ## Field semantics
/// - `start_delay`: upper bound of the pause a unit takes after the gate opens
/// - `start_jitter`: how `start_delay` is randomized
/// - `print_delay`: upper bound of the pause before and after each output write
/// - `print_jitter`: how `print_delay` is randomized
/// - `indent_width`: spaces per ordinal used by indented output
/// - `default_mutex`: id used by `enter_mutex()` / `exit_mutex()`
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Upper bound of the random pause each unit takes before running its task.
    pub start_delay: Duration,

    /// Randomization applied to `start_delay`.
    pub start_jitter: JitterPolicy,

    /// Upper bound of the pause before and after each output write.
    pub print_delay: Duration,

    /// Randomization applied to `print_delay`.
    pub print_jitter: JitterPolicy,

    /// Number of spaces per display ordinal for indented output.
    pub indent_width: usize,

    /// Mutex id used when none is given.
    pub default_mutex: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Configuration without any artificial delay.
    ///
    /// Useful for tests and benchmarks where reproducible timing matters more
    /// than visible interleaving.
    pub fn quiet() -> Self {
        Self {
            start_delay: Duration::ZERO,
            start_jitter: JitterPolicy::None,
            print_delay: Duration::ZERO,
            print_jitter: JitterPolicy::None,
            ..Self::default()
        }
    }

    /// Returns the pause a unit takes after the gate opens.
    #[inline]
    pub fn next_start_delay(&self) -> Duration {
        self.start_jitter.apply(self.start_delay)
    }

    /// Returns the pause taken around an output write.
    #[inline]
    pub fn next_print_delay(&self) -> Duration {
        self.print_jitter.apply(self.print_delay)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `start_delay = 25ms`, `start_jitter = Full`
    /// - `print_delay = 10ms`, `print_jitter = Full`
    /// - `indent_width = 8`
    /// - `default_mutex = "default"`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(25),
            start_jitter: JitterPolicy::Full,
            print_delay: Duration::from_millis(10),
            print_jitter: JitterPolicy::Full,
            indent_width: 8,
            default_mutex: DEFAULT_MUTEX.to_string(),
            bus_capacity: 1024,
        }
    }
}
