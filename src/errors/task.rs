//! Task creation and update errors.

use thiserror::Error;
use uuid::Uuid;

use super::CoreError;
use crate::domain::{TaskOrigin, TaskStage, MAX_TASKS_PER_STAGE};

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(Uuid),

    /// The (origin, source, stage) triple already holds the maximum number of tasks.
    #[error(
        "{origin} source '{source_id}' already has {} tasks in the {stage} stage",
        MAX_TASKS_PER_STAGE
    )]
    CapReached {
        origin: TaskOrigin,
        source_id: String,
        stage: TaskStage,
    },

    #[error("Tasks with origin '{0}' require a sourceId")]
    MissingSource(TaskOrigin),

    #[error("{origin} source '{source_id}' does not exist in this project")]
    UnknownSource {
        origin: TaskOrigin,
        source_id: String,
    },

    #[error("Task text cannot be empty")]
    EmptyText,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl TaskError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TaskError::NotFound(_) => "NOT_FOUND",
            TaskError::CapReached { .. } => "CONFLICT",
            TaskError::MissingSource(_) | TaskError::UnknownSource { .. } | TaskError::EmptyText => {
                "VALIDATION_FAILED"
            }
            TaskError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<TaskError> for CoreError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => CoreError::not_found("Task", id),
            TaskError::CapReached { .. } => CoreError::conflict(err.to_string()),
            TaskError::MissingSource(_) | TaskError::UnknownSource { .. } => {
                CoreError::invalid_field("sourceId", err.to_string())
            }
            TaskError::EmptyText => CoreError::invalid_field("text", err.to_string()),
            TaskError::Database(db_err) => CoreError::database("task operation", db_err),
        }
    }
}
