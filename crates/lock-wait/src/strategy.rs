//! Wait strategies applied between lock acquire attempts.

use std::hint;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, trace};

/// Iterations `IncrementalBackoff` spends spinning before it starts sleeping.
const SPIN_ITERATIONS: u64 = 1000;
/// First iteration at which the backoff stops doubling.
const MULTIPLY_UNTIL_ITERATION: u64 = SPIN_ITERATIONS + 2;
const BACKOFF_CEILING: Duration = Duration::from_nanos(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LockWaitError {
    /// Raised by [`WaitStrategy::NoWait`]; treated like a detected deadlock.
    #[error("cannot acquire lock, and refusing to wait")]
    DeadlockDetected,
    #[error("lock not acquired after {iterations} attempts")]
    TimedOut { iterations: u64 },
}

/// What to do after the `iteration`-th failed attempt to acquire a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Retry immediately, with only a CPU spin hint.
    Spin,
    /// Give up the rest of the time slice, then retry.
    Yield,
    /// Spin for a while, then sleep for growing, capped intervals.
    #[default]
    IncrementalBackoff,
    /// Never wait: the first failed attempt is final.
    NoWait,
}

impl WaitStrategy {
    /// Waits according to the strategy. `Ok` means try again.
    pub fn apply(self, iteration: u64) -> Result<(), LockWaitError> {
        match self {
            WaitStrategy::Spin => {
                hint::spin_loop();
                Ok(())
            }
            WaitStrategy::Yield => {
                thread::yield_now();
                Ok(())
            }
            WaitStrategy::IncrementalBackoff => {
                if iteration < SPIN_ITERATIONS {
                    return WaitStrategy::Spin.apply(iteration);
                }
                if iteration == SPIN_ITERATIONS {
                    trace!(iteration, "lock wait switching from spinning to sleeping");
                }
                thread::sleep(backoff(iteration));
                Ok(())
            }
            WaitStrategy::NoWait => {
                debug!(iteration, "refusing to wait for lock");
                Err(LockWaitError::DeadlockDetected)
            }
        }
    }

    /// Calls `attempt` until it succeeds, waiting between failures.
    ///
    /// Returns the number of failed attempts before the successful one.
    pub fn wait_until(self, mut attempt: impl FnMut() -> bool) -> Result<u64, LockWaitError> {
        let mut iteration = 0;
        loop {
            if attempt() {
                return Ok(iteration);
            }
            self.apply(iteration)?;
            iteration += 1;
        }
    }

    /// Like [`wait_until`](WaitStrategy::wait_until), but gives up once
    /// `timeout` has elapsed.
    pub fn wait_until_timeout(
        self,
        timeout: Duration,
        mut attempt: impl FnMut() -> bool,
    ) -> Result<u64, LockWaitError> {
        let deadline = Instant::now() + timeout;
        let mut iteration = 0;
        loop {
            if attempt() {
                return Ok(iteration);
            }
            if Instant::now() >= deadline {
                return Err(LockWaitError::TimedOut {
                    iterations: iteration + 1,
                });
            }
            self.apply(iteration)?;
            iteration += 1;
        }
    }
}

fn backoff(iteration: u64) -> Duration {
    if iteration < MULTIPLY_UNTIL_ITERATION {
        Duration::from_nanos(1 << (iteration - SPIN_ITERATIONS))
    } else {
        BACKOFF_CEILING
    }
}

/// Lock manager settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    pub wait_strategy: WaitStrategy,
}
