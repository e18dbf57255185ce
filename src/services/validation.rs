use crate::errors::{CoreError, CoreResult, RatingError};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Input checks shared by the services.
pub struct ValidationService;

impl ValidationService {
    /// Trim a required short text field.
    pub fn validate_name(field: &str, value: &str) -> CoreResult<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(CoreError::invalid_field(field, "cannot be empty"));
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(CoreError::invalid_field(
                field,
                format!("is too long (max {} characters)", MAX_NAME_LENGTH),
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Trim an optional long text field; blank becomes `None`.
    pub fn validate_text(field: &str, value: Option<&str>) -> CoreResult<Option<String>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let trimmed = value.trim();

        if trimmed.chars().count() > MAX_TEXT_LENGTH {
            return Err(CoreError::invalid_field(
                field,
                format!("is too long (max {} characters)", MAX_TEXT_LENGTH),
            ));
        }

        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    pub fn validate_resonance(value: i32) -> Result<i32, RatingError> {
        if (1..=5).contains(&value) {
            Ok(value)
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(
            ValidationService::validate_name("name", "  Pilot  ").unwrap(),
            "Pilot"
        );
        let err = ValidationService::validate_name("name", "   ").unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
    }

    #[test]
    fn long_names_are_rejected() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(ValidationService::validate_name("name", &long).is_err());
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(ValidationService::validate_text("notes", Some("  ")).unwrap(), None);
        assert_eq!(
            ValidationService::validate_text("notes", Some(" ok ")).unwrap(),
            Some("ok".to_string())
        );
    }

    #[test]
    fn resonance_bounds() {
        for value in 1..=5 {
            assert_eq!(ValidationService::validate_resonance(value).unwrap(), value);
        }
        assert!(ValidationService::validate_resonance(0).is_err());
        assert!(ValidationService::validate_resonance(6).is_err());
    }
}
