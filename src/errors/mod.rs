//! Error types for the planning services.
//!
//! Services return [`CoreResult`]. Each domain keeps its own `thiserror`
//! enum with precise variants and converts into [`CoreError`], whose
//! [`CoreErrorKind`] is all the HTTP layer needs to pick a status code.
//!
//! ```rust
//! use makeaplan::errors::{CoreError, CoreErrorKind, TaskError};
//! use makeaplan::domain::{TaskOrigin, TaskStage};
//!
//! let err: CoreError = TaskError::CapReached {
//!     origin: TaskOrigin::Heuristic,
//!     source_id: "h-1".to_string(),
//!     stage: TaskStage::Definition,
//! }
//! .into();
//! assert_eq!(err.kind(), CoreErrorKind::Conflict);
//! ```

pub mod core_error;
pub mod db_errors;
pub mod migration;
pub mod plan;
pub mod rating;
pub mod task;

pub use core_error::{CoreError, CoreErrorKind};
pub use db_errors::{format_db_error, DbErrorKind};
pub use migration::MigrationError;
pub use plan::PlanError;
pub use rating::RatingError;
pub use task::TaskError;

pub type CoreResult<T> = Result<T, CoreError>;
