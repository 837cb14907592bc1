//! Creation throttling keyed by actor
//!
//! Services receive a [`RateLimiter`] at construction; there is no
//! process-wide counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use taskflow_config::RateLimitConfig;
use taskflow_domain::ActorId;

/// Decides whether an actor may perform one more throttled operation
pub trait RateLimiter: Send + Sync {
    /// Consume one unit for `actor`; false when the actor is over budget
    fn try_acquire(&self, actor: &ActorId) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket per actor
///
/// Each actor starts with `capacity` tokens; tokens come back at
/// `refill_per_minute` and never exceed `capacity`.
#[derive(Debug)]
pub struct TokenBucketRateLimiter {
    capacity: f64,
    tokens_per_second: f64,
    buckets: Mutex<HashMap<ActorId, Bucket>>,
}

impl TokenBucketRateLimiter {
    pub fn new(capacity: u32, refill_per_minute: u32) -> Self {
        Self {
            capacity: f64::from(capacity),
            tokens_per_second: f64::from(refill_per_minute) / 60.0,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// [`RateLimiter::try_acquire`] against an explicit clock
    pub fn try_acquire_at(&self, actor: &ActorId, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(actor.clone()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.tokens_per_second).min(self.capacity);
        bucket.last_refill = bucket.last_refill.max(now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently held by `actor`, without refilling
    pub fn available(&self, actor: &ActorId) -> f64 {
        self.buckets
            .lock()
            .get(actor)
            .map_or(self.capacity, |b| b.tokens)
    }

    /// Forget all actors
    pub fn reset(&self) {
        self.buckets.lock().clear();
    }
}

impl RateLimiter for TokenBucketRateLimiter {
    fn try_acquire(&self, actor: &ActorId) -> bool {
        self.try_acquire_at(actor, Instant::now())
    }
}

/// Never throttles
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlimitedRateLimiter;

impl RateLimiter for UnlimitedRateLimiter {
    fn try_acquire(&self, _actor: &ActorId) -> bool {
        true
    }
}

/// Build the limiter described by the configuration
pub fn from_config(config: &RateLimitConfig) -> Arc<dyn RateLimiter> {
    if config.enabled {
        Arc::new(TokenBucketRateLimiter::new(
            config.capacity,
            config.refill_per_minute,
        ))
    } else {
        Arc::new(UnlimitedRateLimiter)
    }
}
