//! Token bucket shared by every upstream call.
//!
//! Tokens refill continuously at `rate_per_sec` up to `burst`. Callers that
//! find the bucket empty sleep for the computed deficit and try again; the
//! mutex guards only the accounting and is never held across an await.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::GitHubClientError;

#[derive(Debug)]
pub struct RateLimiter {
    /// Tokens per second. 0 = unlimited.
    rate_per_sec: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a full bucket.
    pub fn new(rate_per_sec: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            rate_per_sec: rate_per_sec.max(0.0),
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0.0, 1)
    }

    /// Takes a token, or returns how long until one is available.
    fn try_acquire(&self) -> Result<(), Duration> {
        if self.rate_per_sec == 0.0 {
            return Ok(());
        }

        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(deficit / self.rate_per_sec))
        }
    }

    /// Waits for a token. Returns `Cancelled` if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), GitHubClientError> {
        loop {
            if cancel.is_cancelled() {
                return Err(GitHubClientError::Cancelled);
            }
            match self.try_acquire() {
                Ok(()) => return Ok(()),
                Err(wait) => {
                    tracing::trace!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(GitHubClientError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }
}
