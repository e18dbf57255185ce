//! Resonance rating errors.

use thiserror::Error;
use uuid::Uuid;

use super::CoreError;

#[derive(Error, Debug)]
pub enum RatingError {
    #[error("Rating {0} not found")]
    NotFound(Uuid),

    #[error("Resonance must be between 1 and 5, got {0}")]
    OutOfRange(i32),

    #[error("Success factor '{0}' does not exist")]
    UnknownFactor(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<RatingError> for CoreError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::NotFound(id) => CoreError::not_found("Rating", id),
            RatingError::OutOfRange(_) => CoreError::invalid_field("resonance", err.to_string()),
            RatingError::UnknownFactor(_) => CoreError::invalid_field("factorId", err.to_string()),
            RatingError::Database(db_err) => CoreError::database("rating operation", db_err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn out_of_range_is_a_validation_error() {
        let err = RatingError::OutOfRange(7);
        assert_eq!(err.to_string(), "Resonance must be between 1 and 5, got 7");
        assert_eq!(CoreError::from(err).kind(), CoreErrorKind::Validation);
    }
}
