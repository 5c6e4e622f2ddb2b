use std::time::Duration;

/// Tuning knobs for a circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures in `Closed` that open the breaker.
    pub failure_threshold: u32,
    /// Time spent in `Open` before trial calls are admitted.
    pub open_timeout: Duration,
    /// Rolling window after which `Closed` tallies reset. Zero disables the reset.
    pub interval: Duration,
    /// Trial calls allowed in flight at once while `HalfOpen`.
    pub max_half_open_requests: u32,
    /// Consecutive trial successes that close the breaker.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(10),
            interval: Duration::from_secs(60),
            max_half_open_requests: 3,
            success_threshold: 1,
        }
    }
}

impl BreakerConfig {
    /// Returns a copy where every count is at least one.
    pub fn sanitized(&self) -> Self {
        Self {
            failure_threshold: self.failure_threshold.max(1),
            open_timeout: self.open_timeout,
            interval: self.interval,
            max_half_open_requests: self.max_half_open_requests.max(1),
            success_threshold: self.success_threshold.max(1),
        }
    }
}
