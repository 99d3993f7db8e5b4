//! Token-bucket rate limiter with continuous refill.

use tokio::time::Instant;

/// Admission gate for outbound backend calls.
///
/// Tokens refill continuously at `refill_rate` per second, capped at
/// `bucket_size`; fractional tokens carry over between checks. Starts full.
/// Not internally synchronised: wrap it in a mutex to share it.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket_size: u32,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(bucket_size: u32, refill_rate: f64) -> Self {
        Self {
            bucket_size,
            refill_rate,
            tokens: f64::from(bucket_size),
            last_refill: Instant::now(),
        }
    }

    /// Take one token if available.
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(f64::from(self.bucket_size));
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Current token level, as of the last check.
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn bucket_size(&self) -> u32 {
        self.bucket_size
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }
}
