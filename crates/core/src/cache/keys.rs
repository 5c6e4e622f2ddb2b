/// Cache key holding the full user collection.
pub const USERS_ALL_KEY: &str = "users:all";

/// Cache key holding the full repository collection.
pub const REPOSITORIES_ALL_KEY: &str = "repositories:all";

/// Returns the cache key for a single user.
pub fn user_key(user_id: u64) -> String {
    format!("user:{}", user_id)
}

/// Returns the cache key for a single repository.
pub fn repository_key(repository_id: u64) -> String {
    format!("repository:{}", repository_id)
}

/// Returns the pub/sub channel name for a domain event topic.
pub fn event_channel(topic: &str) -> String {
    format!("events:{}", topic)
}

/// Pattern matching every domain event channel.
pub const EVENT_CHANNEL_PATTERN: &str = "events:*";

/// Extracts the topic from an event channel name.
///
/// # Examples
///
/// ```
/// use repotrack_core::cache::topic_from_channel;
///
/// assert_eq!(topic_from_channel("events:user_created"), Some("user_created"));
/// assert_eq!(topic_from_channel("user:1"), None);
/// ```
pub fn topic_from_channel(channel: &str) -> Option<&str> {
    channel.strip_prefix("events:").filter(|t| !t.is_empty())
}
