mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    event_channel, repository_key, topic_from_channel, user_key, EVENT_CHANNEL_PATTERN,
    REPOSITORIES_ALL_KEY, USERS_ALL_KEY,
};
pub use serialization::{deserialize_value, serialize_value, SerializationError};
pub use traits::Cache;
