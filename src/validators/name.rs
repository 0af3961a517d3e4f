use super::ValidationError;

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameEmpty);
    }

    if name.len() > 100 {
        return Err(ValidationError::NameTooLong);
    }

    Ok(())
}
