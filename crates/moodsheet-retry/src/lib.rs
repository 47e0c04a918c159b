//! Bounded retry with a fixed interval between attempts.
//!
//! The loop is a small state machine, `Attempting -> {Success, Retrying,
//! Exhausted}`, driven by [`Retry::execute`]. Waiting goes through a
//! [`Sleeper`] so tests can observe the delays instead of serving them.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Delay between two consecutive attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Build from a fractional number of seconds; negative, non-finite or
    /// out-of-range values mean no wait.
    pub fn from_secs_f64(max_attempts: u32, interval_secs: f64) -> Self {
        let interval = Duration::try_from_secs_f64(interval_secs).unwrap_or(Duration::ZERO);
        Self::new(max_attempts, interval)
    }

    /// Whether another attempt is allowed after `attempt` (1-based).
    pub fn allows_attempt_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Where the loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt number `attempt` (1-based) is about to run or running.
    Attempting { attempt: u32 },
    /// `attempt` failed; wait `delay` then try again.
    Retrying { attempt: u32, delay: Duration },
    Success { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl RetryState {
    pub fn start() -> Self {
        RetryState::Attempting { attempt: 1 }
    }

    /// The attempt this state refers to.
    pub fn attempt(&self) -> u32 {
        match *self {
            RetryState::Attempting { attempt } | RetryState::Retrying { attempt, .. } => attempt,
            RetryState::Success { attempts } | RetryState::Exhausted { attempts } => attempts,
        }
    }

    pub fn on_success(self) -> Self {
        match self {
            RetryState::Attempting { attempt } => RetryState::Success { attempts: attempt },
            other => other,
        }
    }

    pub fn on_failure(self, policy: &RetryPolicy) -> Self {
        match self {
            RetryState::Attempting { attempt } if policy.allows_attempt_after(attempt) => {
                RetryState::Retrying {
                    attempt,
                    delay: policy.interval,
                }
            }
            RetryState::Attempting { attempt } => RetryState::Exhausted { attempts: attempt },
            other => other,
        }
    }

    pub fn after_wait(self) -> Self {
        match self {
            RetryState::Retrying { attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Success { .. } | RetryState::Exhausted { .. })
    }
}

/// Blocking wait between attempts.
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

/// Production sleeper: parks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays.borrow_mut().push(delay);
    }
}

/// Retry result
#[derive(Debug, Clone, PartialEq)]
pub struct RetryResult<T, E> {
    /// The successful value, or the error of the last attempt.
    pub outcome: Result<T, E>,
    pub attempts: u32,
}

impl<T, E> RetryResult<T, E> {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Retry utilities
pub struct Retry;

impl Retry {
    /// Run `operation` until it succeeds or the policy runs out of attempts.
    ///
    /// The closure receives the 1-based attempt number. Exactly one wait of
    /// `policy.interval` separates two consecutive attempts; there is no wait
    /// after the last one.
    pub fn execute<T, E, F, S>(policy: &RetryPolicy, sleeper: &S, mut operation: F) -> RetryResult<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        S: Sleeper + ?Sized,
    {
        let mut state = RetryState::start();

        loop {
            let attempt = state.attempt();
            match operation(attempt) {
                Ok(value) => {
                    return RetryResult {
                        outcome: Ok(value),
                        attempts: state.on_success().attempt(),
                    };
                }
                Err(err) => match state.on_failure(policy) {
                    retrying @ RetryState::Retrying { delay, .. } => {
                        tracing::info!("waiting {:.1}s before retry", delay.as_secs_f64());
                        sleeper.sleep(delay);
                        state = retrying.after_wait();
                    }
                    done => {
                        return RetryResult {
                            outcome: Err(err),
                            attempts: done.attempt(),
                        };
                    }
                },
            }
        }
    }
}
