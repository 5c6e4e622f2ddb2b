//! SQLite storage backend implementation.
//!
//! Implements the store traits with `rusqlite` for synchronous operations and
//! `tokio-rusqlite` for async wrapping. Foreign keys are enforced, so the
//! database itself clears owners on user deletion.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteStore;
