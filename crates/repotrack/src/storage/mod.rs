//! Store gateway backends.
//!
//! Concrete implementations of the store traits defined in
//! `repotrack_core::storage`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local tables, for development and tests
//! - `sqlite`: SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p repotrack --no-default-features --features sqlite,memory
//! ```

#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p repotrack --features inmemory"
);

// The pipeline tests run against the in-memory store whatever backend is selected.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "inmemory")]
#[allow(unused_imports)]
pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
#[allow(unused_imports)]
pub use sqlite::SqliteStore;
