mod error;
mod http_mapping;
mod traits;

pub use error::{PipelineError, Result};
pub use http_mapping::pipeline_error_to_status_code;
pub use traits::{RepositoryService, UserService};
