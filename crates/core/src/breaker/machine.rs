//! Deterministic circuit breaker state machine.
//!
//! The machine never reads a clock; callers pass `now` into every operation so
//! transitions can be driven from tests without sleeping.
//!
//! ```text
//!            failures >= threshold
//!   Closed ─────────────────────────► Open
//!     ▲                                │
//!     │ successes >= threshold         │ open_timeout elapsed
//!     │                                ▼
//!     └──────────────────────────── HalfOpen
//!                 any failure ───────► Open
//! ```

use std::fmt;

use serde::Serialize;
use tokio::time::Instant;

use super::BreakerConfig;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, every call goes through.
    Closed,
    /// Failing fast, no call reaches the dependency.
    Open,
    /// Probing recovery with a limited number of trial calls.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Tallies for the current generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    fn on_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }
}

/// A state change, reported so the caller can log or publish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CircuitState,
    pub to: CircuitState,
}

/// Ticket handed out for an admitted call.
///
/// Results are only applied if the machine is still in the generation that
/// admitted the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    generation: u64,
    trial: bool,
}

impl Admission {
    /// Whether the call occupies a half-open trial slot.
    pub fn is_trial(&self) -> bool {
        self.trial
    }
}

/// Why a call was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Open,
    HalfOpenSaturated,
}

#[derive(Debug)]
pub struct BreakerMachine {
    config: BreakerConfig,
    state: CircuitState,
    counts: Counts,
    generation: u64,
    expiry: Option<Instant>,
    in_flight_trials: u32,
    transitions: Vec<Transition>,
}

impl BreakerMachine {
    pub fn new(config: BreakerConfig, now: Instant) -> Self {
        let mut machine = Self {
            config: config.sanitized(),
            state: CircuitState::Closed,
            counts: Counts::default(),
            generation: 0,
            expiry: None,
            in_flight_trials: 0,
            transitions: Vec::new(),
        };
        machine.new_generation(now);
        machine
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state after applying any time-based transition.
    pub fn state(&mut self, now: Instant) -> CircuitState {
        self.refresh(now);
        self.state
    }

    /// Current tallies after applying any time-based transition.
    pub fn counts(&mut self, now: Instant) -> Counts {
        self.refresh(now);
        self.counts
    }

    /// Trial calls currently in flight.
    pub fn in_flight_trials(&self) -> u32 {
        self.in_flight_trials
    }

    /// Asks to run one call.
    pub fn try_admit(&mut self, now: Instant) -> Result<Admission, Rejection> {
        self.refresh(now);

        let trial = match self.state {
            CircuitState::Closed => false,
            CircuitState::Open => return Err(Rejection::Open),
            CircuitState::HalfOpen => {
                if self.in_flight_trials >= self.config.max_half_open_requests {
                    return Err(Rejection::HalfOpenSaturated);
                }
                self.in_flight_trials += 1;
                true
            }
        };

        self.counts.on_request();
        Ok(Admission {
            generation: self.generation,
            trial,
        })
    }

    /// Records the result of an admitted call.
    pub fn record(&mut self, admission: Admission, success: bool, now: Instant) {
        self.refresh(now);

        if admission.generation != self.generation {
            return;
        }
        if admission.trial {
            self.in_flight_trials = self.in_flight_trials.saturating_sub(1);
        }

        if success {
            self.on_success(now);
        } else {
            self.on_failure(now);
        }
    }

    /// Gives back the slot of an admitted call that never completed.
    pub fn release(&mut self, admission: Admission) {
        if admission.generation == self.generation && admission.trial {
            self.in_flight_trials = self.in_flight_trials.saturating_sub(1);
        }
    }

    /// Drains transitions recorded since the last call.
    pub fn take_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    fn on_success(&mut self, now: Instant) {
        match self.state {
            CircuitState::Closed => self.counts.on_success(),
            CircuitState::HalfOpen => {
                self.counts.on_success();
                if self.counts.consecutive_successes >= self.config.success_threshold {
                    self.set_state(CircuitState::Closed, now);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&mut self, now: Instant) {
        match self.state {
            CircuitState::Closed => {
                self.counts.on_failure();
                if self.counts.consecutive_failures >= self.config.failure_threshold {
                    self.set_state(CircuitState::Open, now);
                }
            }
            CircuitState::HalfOpen => self.set_state(CircuitState::Open, now),
            CircuitState::Open => {}
        }
    }

    fn refresh(&mut self, now: Instant) {
        let expired = self.expiry.is_some_and(|expiry| now >= expiry);
        match self.state {
            CircuitState::Closed if expired => self.new_generation(now),
            CircuitState::Open if expired => self.set_state(CircuitState::HalfOpen, now),
            _ => {}
        }
    }

    fn set_state(&mut self, to: CircuitState, now: Instant) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.new_generation(now);
        self.transitions.push(Transition { from, to });
    }

    fn new_generation(&mut self, now: Instant) {
        self.generation += 1;
        self.counts = Counts::default();
        self.in_flight_trials = 0;
        self.expiry = match self.state {
            CircuitState::Closed if self.config.interval.is_zero() => None,
            CircuitState::Closed => Some(now + self.config.interval),
            CircuitState::Open => Some(now + self.config.open_timeout),
            CircuitState::HalfOpen => None,
        };
    }
}
