//! In-memory cache backend implementation.
//!
//! Provides a thread-safe in-memory cache with TTL support and an in-process
//! event publisher for single-instance deployments.

mod cache;
mod publisher;

pub use cache::MemoryCache;
pub use publisher::MemoryPublisher;
