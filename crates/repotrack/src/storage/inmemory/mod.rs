//! In-memory storage backend.
//!
//! Keeps users and repositories in ordered maps behind a single
//! `Arc<RwLock<_>>`, with the same relational rules the SQLite backend
//! enforces: unique emails, existing owners, and owners cleared on user
//! deletion. Data is lost when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use repotrack::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! ```

mod repository;

pub use repository::InMemoryStore;
