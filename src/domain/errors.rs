use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Reject blank identifiers before any engine logic runs
pub fn require_id(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id_rejects_blank() {
        assert!(require_id("driveId", "").is_err());
        assert!(require_id("driveId", "   ").is_err());
        assert!(require_id("driveId", "drive-1").is_ok());
    }

    #[test]
    fn test_require_id_names_the_field() {
        let err = require_id("volunteerId", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: volunteerId must not be empty"
        );
    }
}
