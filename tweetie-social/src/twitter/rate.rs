//! Rate awareness shared by every call made through one session.
//!
//! [`RateGate`] combines a token bucket (steady `qps`, `burst` capacity) with a
//! shared pause: when any caller is throttled it pauses the gate, and every call
//! acquiring afterwards waits the pause out instead of hammering the endpoint.
//! [`call_with_backoff`] wraps a single remote call in that protocol.
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tweetie_common::{Result, TweetieError};

/// How many times a throttled call is attempted, and how long to wait between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            // One full v1.1 rate window.
            max_delay: Duration::from_secs(15 * 60),
        }
    }
}

impl RetryPolicy {
    /// Exponential delay after the `attempt`-th failure (1-based), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

#[derive(Debug)]
struct Bucket {
    qps: f64,
    burst: f64,
    tokens: f64,
    last: Instant,
}

impl Bucket {
    /// Take `need` tokens and return how long the caller must wait for them.
    ///
    /// Tokens may go negative; later callers queue behind the debt.
    fn take(&mut self, need: f64, now: Instant) -> Duration {
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.tokens = (self.tokens + dt * self.qps).min(self.burst);
        self.tokens -= need;

        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-self.tokens / self.qps)
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    bucket: Option<Bucket>,
    paused_until: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct RateGate {
    state: Mutex<GateState>,
}

impl RateGate {
    /// A gate pacing calls at `qps` with up to `burst` calls back to back.
    ///
    /// Non-positive `qps` or zero `burst` disables pacing; pauses still apply.
    pub fn new(qps: f64, burst: u32) -> Self {
        let bucket = (qps.is_finite() && qps > 0.0 && burst > 0).then(|| Bucket {
            qps,
            burst: burst as f64,
            tokens: burst as f64,
            last: Instant::now(),
        });
        Self {
            state: Mutex::new(GateState {
                bucket,
                paused_until: None,
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait until the gate is open and a token is available.
    ///
    /// Returns [`TweetieError::Cancelled`] if `cancel` fires during the wait.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        while let Some(wait) = self.paused_for() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate.gate.paused_wait");
            sleep_or_cancel(wait, cancel).await?;
        }

        let wait = {
            let mut state = self.lock();
            match state.bucket.as_mut() {
                Some(bucket) => bucket.take(1.0, Instant::now()),
                None => Duration::ZERO,
            }
        };
        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "rate.gate.bucket_wait");
            sleep_or_cancel(wait, cancel).await?;
        }
        Ok(())
    }

    /// Hold every subsequent [`acquire`](Self::acquire) for at least `wait`.
    ///
    /// Overlapping pauses extend to the latest deadline; they never shorten it.
    pub fn pause_for(&self, wait: Duration) {
        let until = Instant::now() + wait;
        let mut state = self.lock();
        state.paused_until = Some(match state.paused_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });
    }

    /// Remaining pause, if the gate is currently paused.
    pub fn paused_for(&self) -> Option<Duration> {
        let now = Instant::now();
        let mut state = self.lock();
        match state.paused_until {
            Some(until) if until > now => Some(until - now),
            Some(_) => {
                state.paused_until = None;
                None
            }
            None => None,
        }
    }
}

async fn sleep_or_cancel(wait: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TweetieError::Cancelled),
        _ = sleep(wait) => Ok(()),
    }
}

/// Run `call` through `gate`, retrying throttled attempts under `policy`.
///
/// Only [`TweetieError::RateLimited`] is retried. The server's wait hint wins
/// over the policy's exponential delay; both are capped by `max_delay`. Once
/// attempts run out the last throttling error is returned with its attempt count.
/// Cancelling `cancel` while waiting yields [`TweetieError::Cancelled`].
pub async fn call_with_backoff<T, F, Fut>(
    gate: &RateGate,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    op: &'static str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        if let Err(err) = gate.acquire(cancel).await {
            tracing::info!(op, attempts = attempt, "rate.wait.cancelled");
            return Err(err);
        }
        attempt += 1;

        match call().await {
            Err(TweetieError::RateLimited { retry_after, .. }) if attempt < max_attempts => {
                let delay = retry_after
                    .unwrap_or_else(|| policy.delay_for(attempt))
                    .min(policy.max_delay);
                tracing::warn!(
                    op,
                    attempt,
                    max_attempts,
                    backoff_ms = delay.as_millis() as u64,
                    server_hint = retry_after.is_some(),
                    "rate.backoff"
                );
                gate.pause_for(delay);
            }
            Err(TweetieError::RateLimited { retry_after, .. }) => {
                tracing::warn!(op, attempts = attempt, "rate.exhausted");
                return Err(TweetieError::RateLimited {
                    retry_after,
                    attempts: attempt,
                });
            }
            other => return other,
        }
    }
}
