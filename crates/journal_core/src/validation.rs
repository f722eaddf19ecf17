//! crates/journal_core/src/validation.rs
//!
//! Input checks that run before any external call.

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Entry text cannot be empty")]
    EmptyEntry,
    #[error("Message cannot be empty")]
    EmptyMessage,
}

/// Checks a sign-in form. Both fields must be present.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Checks a sign-up form: sign-in rules plus a minimum password length.
pub fn validate_signup(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_credentials(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_entry_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyEntry);
    }
    Ok(())
}

pub fn validate_coach_message(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(())
}
