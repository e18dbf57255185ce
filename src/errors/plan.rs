//! Plan and block errors.

use thiserror::Error;
use uuid::Uuid;

use super::CoreError;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Plan for project {0} not found")]
    NotFound(Uuid),

    #[error("Unknown block '{0}' (expected block1, block2 or block3)")]
    UnknownBlock(String),

    /// saveBlock payloads are merged key by key and must be JSON objects.
    #[error("Block content must be a JSON object")]
    BlockNotObject,

    #[error("Stored plan blocks are corrupt: {0}")]
    CorruptBlocks(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<PlanError> for CoreError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NotFound(project_id) => CoreError::not_found("Plan", project_id),
            PlanError::UnknownBlock(_) => CoreError::invalid_field("block", err.to_string()),
            PlanError::BlockNotObject => CoreError::validation(err.to_string()),
            PlanError::CorruptBlocks(_) => CoreError::internal(err.to_string()),
            PlanError::Database(db_err) => CoreError::database("plan operation", db_err),
        }
    }
}
