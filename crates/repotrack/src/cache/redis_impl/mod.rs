//! Redis backend.
//!
//! Shares cached entities across instances and carries domain events over
//! Redis pub/sub.

mod cache;
mod error;
mod publisher;

pub use cache::RedisCache;
pub use publisher::RedisPublisher;
