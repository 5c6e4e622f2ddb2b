use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::error::{ValidationError, ValidationReason};
use super::requests::{RepositoryDraft, UserDraft};

pub const USER_NAME_MIN_LEN: usize = 3;
pub const USER_NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;
pub const REPOSITORY_NAME_MAX_LEN: usize = 100;
pub const URL_MAX_LEN: usize = 255;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Validates a user draft before it reaches the store.
///
/// Checks run in field order (`name`, then `email`) and the first violation wins.
pub fn validate_user(draft: &UserDraft) -> Result<(), ValidationError> {
    let name = draft.name.trim();
    check_length("name", name, USER_NAME_MIN_LEN, USER_NAME_MAX_LEN)?;

    let email = draft.email.trim();
    check_length("email", email, 1, EMAIL_MAX_LEN)?;
    if !is_valid_email(email) {
        return Err(ValidationError::new("email", ValidationReason::InvalidEmail));
    }

    Ok(())
}

/// Validates a repository draft before it reaches the store.
///
/// Owner existence is not checked here; the store enforces it on write.
pub fn validate_repository(draft: &RepositoryDraft) -> Result<(), ValidationError> {
    check_length("name", draft.name.trim(), 1, REPOSITORY_NAME_MAX_LEN)?;

    let url = draft.url.trim();
    check_length("url", url, 1, URL_MAX_LEN)?;
    if !is_absolute_url(url) {
        return Err(ValidationError::new("url", ValidationReason::InvalidUrl));
    }

    if draft.user_id == 0 {
        return Err(ValidationError::new(
            "user_id",
            ValidationReason::MissingReference,
        ));
    }

    Ok(())
}

/// Returns true if `email` has plausible address syntax.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns true if `url` parses as an absolute URI with a scheme.
pub fn is_absolute_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, ValidationReason::Empty));
    }
    if len < min {
        return Err(ValidationError::new(field, ValidationReason::TooShort { min }));
    }
    if len > max {
        return Err(ValidationError::new(field, ValidationReason::TooLong { max }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(field: &'static str, reason: ValidationReason) -> Result<(), ValidationError> {
        Err(ValidationError::new(field, reason))
    }

    #[test]
    fn test_valid_user() {
        let draft = UserDraft::new("Ann Lee", "ann@example.com");
        assert!(validate_user(&draft).is_ok());
    }

    #[test]
    fn test_user_name_whitespace_only_is_empty() {
        let draft = UserDraft::new("   ", "ann@example.com");
        assert_eq!(validate_user(&draft), err("name", ValidationReason::Empty));
    }

    #[test]
    fn test_user_name_too_short_after_trim() {
        let draft = UserDraft::new(" Al ", "al@example.com");
        assert_eq!(
            validate_user(&draft),
            err("name", ValidationReason::TooShort { min: 3 })
        );
    }

    #[test]
    fn test_user_name_counts_characters_not_bytes() {
        let draft = UserDraft::new("Zoë", "zoe@example.com");
        assert!(validate_user(&draft).is_ok());

        let draft = UserDraft::new("Zö", "zoe@example.com");
        assert_eq!(
            validate_user(&draft),
            err("name", ValidationReason::TooShort { min: 3 })
        );
    }

    #[test]
    fn test_user_name_too_long() {
        let draft = UserDraft::new("a".repeat(101), "ann@example.com");
        assert_eq!(
            validate_user(&draft),
            err("name", ValidationReason::TooLong { max: 100 })
        );
    }

    #[test]
    fn test_user_email_empty() {
        let draft = UserDraft::new("Ann Lee", "  ");
        assert_eq!(validate_user(&draft), err("email", ValidationReason::Empty));
    }

    #[test]
    fn test_user_email_invalid_syntax() {
        for email in ["ann", "ann@", "ann@example", "@example.com", "ann@example.c"] {
            let draft = UserDraft::new("Ann Lee", email);
            assert_eq!(
                validate_user(&draft),
                err("email", ValidationReason::InvalidEmail),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_user_email_surrounding_whitespace_is_ignored() {
        let draft = UserDraft::new("Ann Lee", " ann.lee+repos@mail.example.org ");
        assert!(validate_user(&draft).is_ok());
    }

    #[test]
    fn test_name_checked_before_email() {
        let draft = UserDraft::new("", "not-an-email");
        assert_eq!(validate_user(&draft), err("name", ValidationReason::Empty));
    }

    #[test]
    fn test_valid_repository() {
        let draft = RepositoryDraft::new("x", 1, "http://a.com");
        assert!(validate_repository(&draft).is_ok());
    }

    #[test]
    fn test_repository_zero_user_id() {
        let draft = RepositoryDraft::new("x", 0, "http://a.com");
        assert_eq!(
            validate_repository(&draft),
            err("user_id", ValidationReason::MissingReference)
        );
    }

    #[test]
    fn test_repository_empty_name() {
        let draft = RepositoryDraft::new(" ", 1, "http://a.com");
        assert_eq!(validate_repository(&draft), err("name", ValidationReason::Empty));
    }

    #[test]
    fn test_repository_empty_url() {
        let draft = RepositoryDraft::new("x", 1, "");
        assert_eq!(validate_repository(&draft), err("url", ValidationReason::Empty));
    }

    #[test]
    fn test_repository_relative_url_rejected() {
        let draft = RepositoryDraft::new("x", 1, "example.com/repo");
        assert_eq!(
            validate_repository(&draft),
            err("url", ValidationReason::InvalidUrl)
        );
    }

    #[test]
    fn test_repository_url_too_long() {
        let url = format!("https://example.com/{}", "a".repeat(255));
        let draft = RepositoryDraft::new("x", 1, url);
        assert_eq!(
            validate_repository(&draft),
            err("url", ValidationReason::TooLong { max: 255 })
        );
    }
}
