//! Input validation for account and session fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Invalid username format.
    InvalidUsername(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Value too short.
    TooShort { field: String, min: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Numeric value that would leave the representable range.
    OutOfRange(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidUsername(msg) => write!(f, "Invalid username: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::TooShort { field, min, actual } => {
                write!(f, "{} is too short ({} chars, min {})", field, actual, min)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::OutOfRange(field) => write!(f, "{} is out of range", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for usernames.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Minimum and maximum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum allowed length for session titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for upstream model ids.
pub const MAX_MODEL_LENGTH: usize = 128;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    // Basic format check: local@domain.tld
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    // Check for common invalid patterns
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Validate a username: ASCII letters, digits, `_`, `-` and `.`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Empty("username".to_string()));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
            actual: username.len(),
        });
    }

    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(ValidationError::InvalidUsername(format!(
            "invalid character '{}'",
            c
        )));
    }

    Ok(())
}

/// Validate a plaintext password before hashing.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();

    if len == 0 {
        return Err(ValidationError::Empty("password".to_string()));
    }

    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
            actual: len,
        });
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a session title.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Empty("title".to_string()));
    }

    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a model id length.
pub fn validate_model_length(model: &str) -> Result<(), ValidationError> {
    let model = model.trim();

    if model.is_empty() {
        return Err(ValidationError::Empty("model".to_string()));
    }

    if model.len() > MAX_MODEL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "model".to_string(),
            max: MAX_MODEL_LENGTH,
            actual: model.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email(" test@example.com ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));

        for email in [
            "test.example.com",
            "test@example@com",
            "@example.com",
            "test@",
            "test@localhost",
            "test@.example.com",
            "test@example..com",
        ] {
            assert!(
                matches!(validate_email(email), Err(ValidationError::InvalidEmail(_))),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_validate_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            validate_email(&email),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_smith-2.0").is_ok());

        assert!(matches!(validate_username(" "), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_username("al ice"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username(&"a".repeat(40)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22").is_ok());
        assert!(matches!(validate_password(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_password("abc"),
            Err(ValidationError::TooShort { min: 6, actual: 3, .. })
        ));
    }

    #[test]
    fn test_validate_title_and_model() {
        assert!(validate_title("New Chat").is_ok());
        assert!(matches!(validate_title("  "), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_title(&"x".repeat(201)),
            Err(ValidationError::TooLong { .. })
        ));

        assert!(validate_model_length("mistralai/mistral-7b-instruct:free").is_ok());
        assert!(matches!(
            validate_model_length(""),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_model_length(&"m".repeat(129)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidEmail("test message".to_string());
        assert_eq!(err.to_string(), "Invalid email: test message");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
            actual: 3,
        };
        assert_eq!(err.to_string(), "password is too short (3 chars, min 6)");
    }
}
