//! Circuit breaker guarding store connections

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Breaker position. The discriminant is what the state gauge exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed = 0,
    /// Store calls are refused locally
    Open = 1,
    /// Letting calls through to see whether the store is back
    HalfOpen = 2,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

/// Thresholds for opening and closing the breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive store errors that open the breaker
    pub failure_threshold: u32,
    /// Successful probes needed to close it again
    pub success_threshold: u32,
    /// How long an open breaker refuses calls before probing (ms)
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug)]
struct Tracker {
    state: CircuitState,
    consecutive_failures: u32,
    probe_successes: u32,
    since: Instant,
}

impl Tracker {
    fn enter(&mut self, state: CircuitState) {
        self.state = state;
        self.since = Instant::now();
        self.probe_successes = 0;
        if state == CircuitState::Closed {
            self.consecutive_failures = 0;
        }
    }
}

/// Shared by the Redis and PostgreSQL pools.
///
/// After repeated store errors template reads fail fast with an
/// "unavailable" error instead of stacking up on connection timeouts.
pub struct CircuitBreaker {
    tracker: Mutex<Tracker>,
    reset_timeout: Duration,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            tracker: Mutex::new(Tracker {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                probe_successes: 0,
                since: Instant::now(),
            }),
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
            config,
        }
    }

    // Counters stay meaningful even if a holder panicked
    fn lock(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the tracker, first letting an expired open breaker go half-open.
    fn current(&self) -> MutexGuard<'_, Tracker> {
        let mut tracker = self.lock();
        if tracker.state == CircuitState::Open && tracker.since.elapsed() >= self.reset_timeout {
            tracker.enter(CircuitState::HalfOpen);
            tracing::info!("Store circuit breaker half-open, probing");
        }
        tracker
    }

    pub fn state(&self) -> CircuitState {
        self.current().state
    }

    pub fn allow_request(&self) -> bool {
        self.state() != CircuitState::Open
    }

    pub fn record_success(&self) {
        let mut tracker = self.lock();
        match tracker.state {
            CircuitState::Closed => tracker.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                tracker.probe_successes += 1;
                if tracker.probe_successes >= self.config.success_threshold {
                    tracker.enter(CircuitState::Closed);
                    tracing::info!("Store circuit breaker closed after recovery");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut tracker = self.lock();
        match tracker.state {
            CircuitState::Closed => {
                tracker.consecutive_failures += 1;
                let failures = tracker.consecutive_failures;
                if failures >= self.config.failure_threshold {
                    tracker.enter(CircuitState::Open);
                    tracing::warn!(failures, "Store circuit breaker opened");
                }
            }
            CircuitState::HalfOpen => {
                tracker.enter(CircuitState::Open);
                tracing::warn!("Store circuit breaker reopened during probe");
            }
            // A straggler failing keeps the breaker open for another full timeout
            CircuitState::Open => tracker.since = Instant::now(),
        }
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let tracker = self.current();
        CircuitBreakerStats {
            state: tracker.state,
            failure_count: tracker.consecutive_failures,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Reported on `/health`
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
}
