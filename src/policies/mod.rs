//! Delay shaping policies.
//!
//! Every artificial pause in taskgate (the start delay of a unit, the delays
//! around output, [`sleep_random`](crate::sleep_random)) goes through a
//! [`JitterPolicy`]. Randomized pauses are what make interleavings visible;
//! [`JitterPolicy::None`] turns them into fixed delays for reproducible runs.
//!
//! ## Defaults
//! - `Config::start_jitter = JitterPolicy::Full` with `start_delay = 25ms`
//! - `Config::print_jitter = JitterPolicy::Full` with `print_delay = 10ms`

mod jitter;

pub use jitter::JitterPolicy;
