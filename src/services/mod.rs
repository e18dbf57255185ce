//! Persistence-backed services, one per resource kind.
//!
//! Every service owns a `DatabaseConnection` clone and returns
//! [`CoreResult`]; the HTTP handlers are thin wrappers around them.

pub mod framework_service;
pub mod heuristic_service;
pub mod id_migration_service;
pub mod organisation_service;
pub mod plan_service;
pub mod policy_service;
pub mod progress_service;
pub mod project_service;
pub mod rating_service;
pub mod success_factor_service;
pub mod task_service;
pub mod validation;

pub use framework_service::*;
pub use heuristic_service::*;
pub use id_migration_service::*;
pub use organisation_service::*;
pub use plan_service::*;
pub use policy_service::*;
pub use progress_service::*;
pub use project_service::*;
pub use rating_service::*;
pub use success_factor_service::*;
pub use task_service::*;
pub use validation::*;

use sea_orm::{ConnectionTrait, EntityTrait};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::database::entities::projects;
use crate::errors::{CoreError, CoreResult};

/// Load a project or fail with a not-found error.
pub async fn require_project<C>(db: &C, project_id: Uuid) -> CoreResult<projects::Model>
where
    C: ConnectionTrait,
{
    projects::Entity::find_by_id(project_id)
        .one(db)
        .await
        .map_err(|e| CoreError::database("load project", e))?
        .ok_or_else(|| CoreError::not_found("Project", project_id))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
