//! Failure isolation for store calls.

mod breaker;

pub use breaker::{BreakerSnapshot, CircuitBreaker};
