//! Retry and pacing policies.
//!
//! Every wait in the pipeline goes through a [`Sleeper`], so tests can run the
//! whole thing without touching the wall clock.
use std::time::Duration;

/// Something that can block the current thread for a while.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Delay before a retry, as a function of how many attempts have failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    step: Duration,
}

impl Backoff {
    /// The same delay before every retry.
    pub fn fixed(delay: Duration) -> Self {
        Self::linear(delay, Duration::ZERO)
    }

    /// Starts at `initial`, growing by `step` after every failure.
    pub fn linear(initial: Duration, step: Duration) -> Self {
        Self { initial, step }
    }

    /// The delay after the `failures`-th consecutive failure (1-based).
    pub fn delay(&self, failures: u32) -> Duration {
        self.initial + self.step * failures.saturating_sub(1)
    }
}

/// How many times an operation may be attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempts {
    Limited(u32),
    /// Keep trying until the operation succeeds.
    Unlimited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Backoff,
    pub attempts: Attempts,
}

impl RetryPolicy {
    pub fn new(backoff: Backoff, attempts: Attempts) -> Self {
        Self { backoff, attempts }
    }

    /// Resolving a post: every five seconds, giving up after five minutes.
    pub fn metadata() -> Self {
        Self::new(Backoff::fixed(Duration::from_secs(5)), Attempts::Limited(60))
    }

    /// Resolving a post: every five seconds, forever.
    pub fn metadata_best_effort() -> Self {
        Self::new(Backoff::fixed(Duration::from_secs(5)), Attempts::Unlimited)
    }

    /// Submitting to the archive: 3s, 4s, 5s, ... for up to 1000 attempts.
    pub fn archive() -> Self {
        Self::new(
            Backoff::linear(Duration::from_secs(3), Duration::from_secs(1)),
            Attempts::Limited(1000),
        )
    }

    /// Whether another attempt is allowed after `failures` consecutive failures.
    pub fn allows_retry(&self, failures: u32) -> bool {
        match self.attempts {
            Attempts::Limited(max) => failures < max,
            Attempts::Unlimited => true,
        }
    }

    /// Runs `op` until it succeeds, fails with an error `retryable` rejects, or the
    /// attempt budget runs out.
    ///
    /// On failure the error is returned together with the number of attempts made.
    pub fn run<T, E, F, R>(
        &self,
        sleeper: &dyn Sleeper,
        retryable: R,
        mut op: F,
    ) -> Result<T, (E, u32)>
    where
        F: FnMut() -> Result<T, E>,
        R: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut failures = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if !retryable(&err) || !self.allows_retry(failures) {
                        return Err((err, failures));
                    }

                    let delay = self.backoff.delay(failures);
                    tracing::debug!(attempt = failures, ?delay, "retrying after error: {}", err);
                    sleeper.sleep(delay);
                }
            }
        }
    }
}

/// Decides how long to hold off after a request has finished.
pub trait Pace {
    /// Blocks after a request, before the next one may go out.
    fn pause(&self, sleeper: &dyn Sleeper);
}

/// A fixed pause after every request, however long the request itself took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacer {
    period: Duration,
}

impl Pacer {
    /// A pacer holding off for `period` after each request. A zero period never waits.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Pace for Pacer {
    fn pause(&self, sleeper: &dyn Sleeper) {
        if !self.period.is_zero() {
            sleeper.sleep(self.period);
        }
    }
}
