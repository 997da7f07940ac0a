//! # Jitter policy for artificial delays.
//!
//! [`JitterPolicy`] turns a configured upper bound into the delay actually slept.
//!
//! - [`JitterPolicy::None`]: no randomization, sleep exactly the bound
//! - [`JitterPolicy::Full`]: random delay in [0, bound] (default, maximum interleaving)
//! - [`JitterPolicy::Equal`]: delay = bound/2 + random[0, bound/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of artificial delays.
///
/// ## Trade-offs
/// - **None**: reproducible timing, hides most interleavings
/// - **Full**: widest spread, surfaces the most interleavings
/// - **Equal**: keeps at least half of the bound
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Use the exact bound.
    None,

    /// Random delay in [0, bound].
    #[default]
    Full,

    /// delay = bound/2 + random[0, bound/2].
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given bound.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use taskgate::JitterPolicy;
    ///
    /// let d = JitterPolicy::Full.apply(Duration::from_millis(25));
    /// assert!(d <= Duration::from_millis(25));
    /// assert_eq!(JitterPolicy::None.apply(Duration::from_millis(7)), Duration::from_millis(7));
    /// ```
    pub fn apply(&self, bound: Duration) -> Duration {
        match self {
            JitterPolicy::None => bound,
            JitterPolicy::Full => Self::full_jitter(bound),
            JitterPolicy::Equal => Self::equal_jitter(bound),
        }
    }

    /// Full jitter: random[0, bound]
    fn full_jitter(bound: Duration) -> Duration {
        let ms = bound.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        Duration::from_millis(rng.random_range(0..=ms))
    }

    /// Equal jitter: bound/2 + random[0, bound/2]
    fn equal_jitter(bound: Duration) -> Duration {
        let ms = bound.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let half = ms / 2;
        let jitter = if half == 0 {
            0
        } else {
            rand::rng().random_range(0..=half)
        };
        Duration::from_millis(half + jitter)
    }
}
