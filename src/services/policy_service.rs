use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::entities::{policies, project_tasks};
use crate::domain::TaskOrigin;
use crate::errors::{CoreError, CoreResult};
use crate::services::{double_option, require_project, ValidationService};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the project's organisation.
    #[serde(default)]
    pub organisation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
}

#[derive(Clone)]
pub struct PolicyService {
    db: DatabaseConnection,
}

impl PolicyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, project_id: Uuid) -> CoreResult<Vec<policies::Model>> {
        require_project(&self.db, project_id).await?;

        policies::Entity::find()
            .filter(policies::Column::ProjectId.eq(project_id))
            .order_by_asc(policies::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list policies", e))
    }

    pub async fn create(&self, project_id: Uuid, input: CreatePolicy) -> CoreResult<policies::Model> {
        let project = require_project(&self.db, project_id).await?;
        let name = ValidationService::validate_name("name", &input.name)?;
        let description =
            ValidationService::validate_text("description", input.description.as_deref())?;

        let now = chrono::Utc::now();
        policies::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            organisation_id: Set(input.organisation_id.or(project.organisation_id)),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| CoreError::database("create policy", e))
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        policy_id: Uuid,
        input: UpdatePolicy,
    ) -> CoreResult<policies::Model> {
        let policy = policies::Entity::find_by_id(policy_id)
            .filter(policies::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load policy", e))?
            .ok_or_else(|| CoreError::not_found("Policy", policy_id))?;

        let mut active: policies::ActiveModel = policy.into();
        if let Some(name) = input.name.as_deref() {
            active.name = Set(ValidationService::validate_name("name", name)?);
        }
        if let Some(description) = input.description {
            active.description = Set(ValidationService::validate_text(
                "description",
                description.as_deref(),
            )?);
        }
        active.updated_at = Set(chrono::Utc::now());

        active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("update policy", e))
    }

    /// Delete the policy and every task it generated, atomically. Returns the
    /// number of tasks removed.
    pub async fn delete(&self, project_id: Uuid, policy_id: Uuid) -> CoreResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let tasks = project_tasks::Entity::delete_many()
            .filter(project_tasks::Column::ProjectId.eq(project_id))
            .filter(project_tasks::Column::Origin.eq(TaskOrigin::Policy.as_ref()))
            .filter(project_tasks::Column::SourceId.eq(policy_id.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::database("delete policy tasks", e))?;

        let result = policies::Entity::delete_many()
            .filter(policies::Column::Id.eq(policy_id))
            .filter(policies::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::database("delete policy", e))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| CoreError::database("rollback", e))?;
            return Err(CoreError::not_found("Policy", policy_id));
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::database("commit policy delete", e))?;

        info!(
            "Deleted policy {} and {} generated tasks",
            policy_id, tasks.rows_affected
        );
        Ok(tasks.rows_affected)
    }
}
