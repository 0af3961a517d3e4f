use super::ValidationError;

/// Minimum password length accepted at registration and reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, bounding argon2 work per request.
pub const MAX_PASSWORD_LENGTH: usize = 128;

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
