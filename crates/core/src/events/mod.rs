mod error;
mod traits;
mod types;

pub use error::{PublishError, Result};
pub use traits::{EventPublisher, EventSubscriber};
pub use types::{topic_name, ChangeKind, DomainEvent, EntityKind};
