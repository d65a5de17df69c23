//! Per-platform token-bucket admission control.
//!
//! The bucket map is the only cross-session shared mutable state in the
//! core. Each bucket refills continuously at its configured rate; waiters
//! queue on the bucket's async mutex and hold it while sleeping for the
//! next token, so grants are strictly FIFO and no session can starve
//! another indefinitely.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use citewatch_core::{PlatformId, PlatformLimit};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("no rate limit bucket configured for platform '{0}'")]
    UnknownPlatform(PlatformId),

    #[error("rate limit wait timed out for platform '{0}'")]
    Exceeded(PlatformId),
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

struct Bucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl Bucket {
    fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_sec,
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, sleeping until one matures if the bucket is empty.
    ///
    /// The bucket mutex is held across the sleep: tokio's mutex queues
    /// waiters FIFO, so the oldest waiter always receives the next token.
    async fn take(&self) {
        let mut state = self.state.lock().await;
        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(state.last_refill).as_secs_f64();
            state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            state.last_refill = now;

            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                return;
            }

            let deficit = 1.0 - state.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_per_sec);
            tokio::time::sleep(wait).await;
        }
    }
}

/// FIFO token-bucket gate over all configured platforms.
pub struct RateLimiter {
    buckets: HashMap<PlatformId, Bucket>,
}

impl RateLimiter {
    /// Build one bucket per configured platform limit.
    #[must_use]
    pub fn new(limits: &[PlatformLimit]) -> Self {
        let buckets = limits
            .iter()
            .map(|l| (l.platform, Bucket::new(l.capacity, l.refill_per_sec)))
            .collect();
        Self { buckets }
    }

    /// Block the calling task until a token for `platform` is available or
    /// `wait_timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`RateLimitError::UnknownPlatform`] when no bucket is configured for
    /// `platform`; [`RateLimitError::Exceeded`] when the wait times out.
    pub async fn acquire(
        &self,
        platform: PlatformId,
        wait_timeout: Duration,
    ) -> Result<(), RateLimitError> {
        let bucket = self
            .buckets
            .get(&platform)
            .ok_or(RateLimitError::UnknownPlatform(platform))?;

        tokio::time::timeout(wait_timeout, bucket.take())
            .await
            .map_err(|_| RateLimitError::Exceeded(platform))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn limiter(platform: PlatformId, capacity: u32, refill_per_sec: f64) -> RateLimiter {
        RateLimiter::new(&[PlatformLimit {
            platform,
            capacity,
            refill_per_sec,
            endpoint: None,
        }])
    }

    #[tokio::test]
    async fn grants_within_capacity_immediately() {
        let limiter = limiter(PlatformId::ChatGpt, 3, 1.0);
        for _ in 0..3 {
            limiter
                .acquire(PlatformId::ChatGpt, Duration::from_millis(10))
                .await
                .expect("grant within capacity");
        }
    }

    #[tokio::test]
    async fn unknown_platform_is_rejected() {
        let limiter = limiter(PlatformId::ChatGpt, 1, 1.0);
        let result = limiter
            .acquire(PlatformId::Reddit, Duration::from_secs(1))
            .await;
        assert_eq!(result, Err(RateLimitError::UnknownPlatform(PlatformId::Reddit)));
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_one_gives_one_immediate_and_one_delayed_grant() {
        // Capacity 1, refill 1 token / 10s: of two concurrent acquires,
        // exactly one is granted immediately; the other must wait out the
        // refill or time out. Never two immediate grants.
        let limiter = Arc::new(limiter(PlatformId::ChatGpt, 1, 0.1));

        let first = limiter
            .acquire(PlatformId::ChatGpt, Duration::from_millis(10))
            .await;
        assert!(first.is_ok(), "first acquire should be immediate");

        let second = limiter
            .acquire(PlatformId::ChatGpt, Duration::from_secs(1))
            .await;
        assert_eq!(
            second,
            Err(RateLimitError::Exceeded(PlatformId::ChatGpt)),
            "second acquire must wait for refill and time out before 10s"
        );

        let third = limiter
            .acquire(PlatformId::ChatGpt, Duration::from_secs(30))
            .await;
        assert!(third.is_ok(), "a long enough wait is eventually granted");
    }

    #[tokio::test(start_paused = true)]
    async fn refill_restores_tokens_up_to_capacity() {
        let limiter = limiter(PlatformId::Gemini, 2, 1.0);

        for _ in 0..2 {
            limiter
                .acquire(PlatformId::Gemini, Duration::from_millis(10))
                .await
                .expect("initial capacity");
        }

        tokio::time::sleep(Duration::from_secs(60)).await;

        // Only `capacity` tokens may have accumulated, not 60.
        for _ in 0..2 {
            limiter
                .acquire(PlatformId::Gemini, Duration::from_millis(10))
                .await
                .expect("refilled token");
        }
        let over = limiter
            .acquire(PlatformId::Gemini, Duration::from_millis(10))
            .await;
        assert_eq!(over, Err(RateLimitError::Exceeded(PlatformId::Gemini)));
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_are_granted_in_fifo_order() {
        let limiter = Arc::new(limiter(PlatformId::Reddit, 1, 1.0));
        limiter
            .acquire(PlatformId::Reddit, Duration::from_millis(10))
            .await
            .expect("drain initial token");

        let order = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..3usize {
            let limiter = Arc::clone(&limiter);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                limiter
                    .acquire(PlatformId::Reddit, Duration::from_secs(30))
                    .await
                    .expect("eventual grant");
                (i, order.fetch_add(1, Ordering::SeqCst))
            }));
            // Let the waiter enqueue on the bucket before spawning the next.
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        for handle in handles {
            let (spawn_idx, grant_idx) = handle.await.expect("join");
            assert_eq!(
                spawn_idx, grant_idx,
                "waiter spawned {spawn_idx} was granted {grant_idx}"
            );
        }
    }
}
