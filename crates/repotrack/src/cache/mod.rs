//! Cache and event publisher backends.
//!
//! Concrete implementations of the `repotrack_core::cache` and
//! `repotrack_core::events` traits, selected at compile time.
//!
//! # Feature Flags
//!
//! - `memory` (default): in-process LRU cache and broadcast publisher
//! - `redis`: shared Redis cache and Redis pub/sub publisher
//!
//! These features are mutually exclusive.

#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p repotrack --features memory"
);

// Pipeline and HTTP tests run against the in-memory backend whatever backend is selected.
#[cfg(any(feature = "memory", test))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

#[cfg(feature = "memory")]
#[allow(unused_imports)]
pub use memory::{MemoryCache, MemoryPublisher};

#[cfg(feature = "redis")]
#[allow(unused_imports)]
pub use redis_impl::{RedisCache, RedisPublisher};
