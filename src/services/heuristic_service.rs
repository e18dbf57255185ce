use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::entities::{personal_heuristics as heuristics, project_tasks};
use crate::domain::TaskOrigin;
use crate::errors::{CoreError, CoreResult};
use crate::services::{double_option, find_factor, require_project, ValidationService};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateHeuristic {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub factor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateHeuristic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
    /// `null` unlinks the heuristic from its factor.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub factor_id: Option<Option<String>>,
}

#[derive(Clone)]
pub struct HeuristicService {
    db: DatabaseConnection,
}

impl HeuristicService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, project_id: Uuid) -> CoreResult<Vec<heuristics::Model>> {
        require_project(&self.db, project_id).await?;

        heuristics::Entity::find()
            .filter(heuristics::Column::ProjectId.eq(project_id))
            .order_by_asc(heuristics::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list heuristics", e))
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        input: CreateHeuristic,
    ) -> CoreResult<heuristics::Model> {
        require_project(&self.db, project_id).await?;

        let name = ValidationService::validate_name("name", &input.name)?;
        let description =
            ValidationService::validate_text("description", input.description.as_deref())?;
        let factor_id = resolve_factor(&self.db, input.factor_id.as_deref()).await?;

        let now = chrono::Utc::now();
        heuristics::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            factor_id: Set(factor_id),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| CoreError::database("create heuristic", e))
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        heuristic_id: Uuid,
        input: UpdateHeuristic,
    ) -> CoreResult<heuristics::Model> {
        let heuristic = self.find(project_id, heuristic_id).await?;
        let mut active: heuristics::ActiveModel = heuristic.into();

        if let Some(name) = input.name.as_deref() {
            active.name = Set(ValidationService::validate_name("name", name)?);
        }
        if let Some(description) = input.description {
            active.description = Set(ValidationService::validate_text(
                "description",
                description.as_deref(),
            )?);
        }
        if let Some(factor_id) = input.factor_id {
            active.factor_id = Set(resolve_factor(&self.db, factor_id.as_deref()).await?);
        }
        active.updated_at = Set(chrono::Utc::now());

        active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("update heuristic", e))
    }

    /// Delete the heuristic and the tasks generated from it. Returns the
    /// number of tasks removed.
    pub async fn delete(&self, project_id: Uuid, heuristic_id: Uuid) -> CoreResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let tasks = project_tasks::Entity::delete_many()
            .filter(project_tasks::Column::ProjectId.eq(project_id))
            .filter(project_tasks::Column::Origin.eq(TaskOrigin::Heuristic.as_ref()))
            .filter(project_tasks::Column::SourceId.eq(heuristic_id.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::database("delete heuristic tasks", e))?;

        let result = heuristics::Entity::delete_many()
            .filter(heuristics::Column::Id.eq(heuristic_id))
            .filter(heuristics::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::database("delete heuristic", e))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| CoreError::database("rollback", e))?;
            return Err(CoreError::not_found("Heuristic", heuristic_id));
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::database("commit heuristic delete", e))?;

        info!(
            "Deleted heuristic {} and {} generated tasks",
            heuristic_id, tasks.rows_affected
        );
        Ok(tasks.rows_affected)
    }

    async fn find(&self, project_id: Uuid, heuristic_id: Uuid) -> CoreResult<heuristics::Model> {
        heuristics::Entity::find_by_id(heuristic_id)
            .filter(heuristics::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load heuristic", e))?
            .ok_or_else(|| CoreError::not_found("Heuristic", heuristic_id))
    }
}

/// Validate an optional factor link and return the stored factor id.
async fn resolve_factor<C>(db: &C, factor_id: Option<&str>) -> CoreResult<Option<String>>
where
    C: ConnectionTrait,
{
    let Some(factor_id) = factor_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(None);
    };

    let factor = find_factor(db, factor_id).await?.ok_or_else(|| {
        CoreError::invalid_field(
            "factorId",
            format!("success factor '{}' does not exist", factor_id),
        )
    })?;
    Ok(Some(factor.id))
}
