//! Functional core for repotrack.
//!
//! Domain types, validation rules, cache keys, the breaker state machine and the
//! trait seams the server plugs its backends into. Nothing here performs I/O.

pub mod breaker;
pub mod cache;
pub mod domain;
pub mod events;
pub mod pipeline;
pub mod storage;
