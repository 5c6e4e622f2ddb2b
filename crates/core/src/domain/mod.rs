mod error;
mod operations;
mod requests;
mod types;

pub use error::{ValidationError, ValidationReason};
pub use operations::{
    is_absolute_url, is_valid_email, validate_repository, validate_user, EMAIL_MAX_LEN,
    REPOSITORY_NAME_MAX_LEN, URL_MAX_LEN, USER_NAME_MAX_LEN, USER_NAME_MIN_LEN,
};
pub use requests::{RepositoryDraft, UserDraft};
pub use types::{Repository, User};
