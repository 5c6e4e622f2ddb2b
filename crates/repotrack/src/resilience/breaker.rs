//! Shared circuit breaker around store calls.
//!
//! Wraps the pure [`BreakerMachine`] behind a mutex that is never held across an
//! await point. State changes are logged and published on a watch channel.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use repotrack_core::breaker::{
    Admission, BreakerConfig, BreakerError, BreakerMachine, BreakerOutcome, CircuitState, Counts,
    Transition,
};

/// Point-in-time view of a breaker, for health probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub counts: Counts,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    machine: Mutex<BreakerMachine>,
    state_tx: watch::Sender<CircuitState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        let name = name.into();
        let machine = BreakerMachine::new(config, Instant::now());
        let config = machine.config();

        tracing::info!(
            breaker = %name,
            failure_threshold = config.failure_threshold,
            open_timeout_secs = config.open_timeout.as_secs(),
            interval_secs = config.interval.as_secs(),
            max_half_open_requests = config.max_half_open_requests,
            "Circuit breaker initialized"
        );

        let (state_tx, _) = watch::channel(CircuitState::Closed);
        Self {
            name,
            machine: Mutex::new(machine),
            state_tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.with_machine(|machine| machine.state(Instant::now()))
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let (state, counts) = self.with_machine(|machine| {
            let now = Instant::now();
            (machine.state(now), machine.counts(now))
        });
        BreakerSnapshot {
            name: self.name.clone(),
            state,
            counts,
        }
    }

    /// Watches state changes.
    pub fn subscribe(&self) -> watch::Receiver<CircuitState> {
        self.state_tx.subscribe()
    }

    /// Runs one operation under breaker protection.
    ///
    /// Returns [`BreakerError::Open`] without calling `operation` when the
    /// breaker is open or every half-open trial slot is taken. Errors that are
    /// not breaker failures are passed through and count as successes.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: BreakerOutcome,
    {
        let admission = match self.with_machine(|machine| machine.try_admit(Instant::now())) {
            Ok(admission) => admission,
            Err(rejection) => {
                tracing::debug!(breaker = %self.name, ?rejection, "Call rejected");
                return Err(BreakerError::Open {
                    name: self.name.clone(),
                });
            }
        };

        let mut guard = AdmissionGuard {
            breaker: self,
            admission: Some(admission),
        };

        let result = operation().await;

        let success = match &result {
            Ok(_) => true,
            Err(err) => !err.is_breaker_failure(),
        };
        guard.complete(success);

        result.map_err(BreakerError::Operation)
    }

    fn with_machine<R>(&self, f: impl FnOnce(&mut BreakerMachine) -> R) -> R {
        let mut machine = self.machine.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut machine);
        let transitions = machine.take_transitions();
        drop(machine);

        for transition in transitions {
            self.report(transition);
        }
        result
    }

    fn report(&self, transition: Transition) {
        let Transition { from, to } = transition;
        match to {
            CircuitState::Open => {
                tracing::error!(breaker = %self.name, %from, %to, "Circuit breaker opened")
            }
            CircuitState::HalfOpen => {
                tracing::warn!(breaker = %self.name, %from, %to, "Circuit breaker half-open")
            }
            CircuitState::Closed => {
                tracing::info!(breaker = %self.name, %from, %to, "Circuit breaker closed")
            }
        }
        self.state_tx.send_replace(to);
    }
}

/// Returns the admission to the machine if the call never completes.
struct AdmissionGuard<'a> {
    breaker: &'a CircuitBreaker,
    admission: Option<Admission>,
}

impl AdmissionGuard<'_> {
    fn complete(&mut self, success: bool) {
        if let Some(admission) = self.admission.take() {
            self.breaker
                .with_machine(|machine| machine.record(admission, success, Instant::now()));
        }
    }
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        if let Some(admission) = self.admission.take() {
            tracing::debug!(
                breaker = %self.breaker.name,
                trial = admission.is_trial(),
                "Call cancelled before completion"
            );
            self.breaker.with_machine(|machine| machine.release(admission));
        }
    }
}
