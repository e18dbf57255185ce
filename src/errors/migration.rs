//! Errors raised by the legacy id migration.

use thiserror::Error;

use super::CoreError;

#[derive(Error, Debug)]
pub enum MigrationError {
    /// Two legacy ids hash to an id that already belongs to another factor.
    #[error("Success factor '{legacy_id}' maps to {new_id}, which already exists")]
    Collision { legacy_id: String, new_id: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<MigrationError> for CoreError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Collision { .. } => CoreError::conflict(err.to_string()),
            MigrationError::Database(db_err) => CoreError::database("legacy id migration", db_err),
        }
    }
}
