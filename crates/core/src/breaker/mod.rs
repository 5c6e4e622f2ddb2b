mod config;
mod error;
mod machine;

pub use config::BreakerConfig;
pub use error::{BreakerError, BreakerOutcome};
pub use machine::{Admission, BreakerMachine, CircuitState, Counts, Rejection, Transition};
