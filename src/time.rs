//! Delay primitives.
//!
//! Async counterparts of a thread sleep: the calling unit is suspended, its
//! worker thread is not.

use std::time::Duration;

use crate::policies::JitterPolicy;

/// Suspends the caller for `duration`.
pub async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Suspends the caller for a random duration in [0, max].
pub async fn sleep_random(max: Duration) {
    sleep(JitterPolicy::Full.apply(max)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn sleep_random_stays_within_bound() {
        let start = Instant::now();
        sleep_random(Duration::from_millis(20)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_waits_the_full_duration() {
        let start = tokio::time::Instant::now();
        sleep(Duration::from_millis(300)).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
