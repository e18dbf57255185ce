use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::database::entities::{organisations, plans, projects};
use crate::errors::{CoreError, CoreResult};
use crate::services::{require_project, ValidationService};

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Empty block set written alongside every new project.
pub fn empty_blocks() -> serde_json::Value {
    json!({ "block1": {}, "block2": {}, "block3": {} })
}

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a project together with its (empty) plan.
    pub async fn create(&self, input: CreateProject) -> CoreResult<projects::Model> {
        let name = ValidationService::validate_name("name", &input.name)?;
        let description =
            ValidationService::validate_text("description", input.description.as_deref())?;
        let user_id = ValidationService::validate_text("userId", input.user_id.as_deref())?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        if let Some(organisation_id) = input.organisation_id {
            organisations::Entity::find_by_id(organisation_id)
                .one(&txn)
                .await
                .map_err(|e| CoreError::database("load organisation", e))?
                .ok_or_else(|| CoreError::not_found("Organisation", organisation_id))?;
        }

        let mut project = projects::ActiveModel::new();
        project.name = Set(name);
        project.description = Set(description);
        project.organisation_id = Set(input.organisation_id);
        project.user_id = Set(user_id);

        let project = project
            .insert(&txn)
            .await
            .map_err(|e| CoreError::database("create project", e))?;

        let now = chrono::Utc::now();
        plans::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            blocks: Set(empty_blocks()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| CoreError::database("create plan", e))?;

        txn.commit()
            .await
            .map_err(|e| CoreError::database("commit project", e))?;

        info!("Created project {} ({})", project.name, project.id);
        Ok(project)
    }

    pub async fn list(&self, user_id: Option<&str>) -> CoreResult<Vec<projects::Model>> {
        let mut query = projects::Entity::find();
        if let Some(user_id) = user_id {
            query = query.filter(projects::Column::UserId.eq(user_id));
        }

        query
            .order_by_desc(projects::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list projects", e))
    }

    pub async fn list_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> CoreResult<Vec<projects::Model>> {
        organisations::Entity::find_by_id(organisation_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load organisation", e))?
            .ok_or_else(|| CoreError::not_found("Organisation", organisation_id))?;

        projects::Entity::find()
            .filter(projects::Column::OrganisationId.eq(organisation_id))
            .order_by_desc(projects::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list organisation projects", e))
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<projects::Model> {
        require_project(&self.db, id).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateProject) -> CoreResult<projects::Model> {
        let project = require_project(&self.db, id).await?;
        let mut active: projects::ActiveModel = project.into();

        if let Some(name) = input.name.as_deref() {
            active.name = Set(ValidationService::validate_name("name", name)?);
        }
        if let Some(description) = input.description.as_deref() {
            active.description =
                Set(ValidationService::validate_text("description", Some(description))?);
        }

        active
            .set_updated_at()
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("update project", e))
    }

    /// Removes the project; the plan and every project-scoped row cascade.
    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = projects::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::database("delete project", e))?;

        if result.rows_affected == 0 {
            return Err(CoreError::not_found("Project", id));
        }

        info!("Deleted project {}", id);
        Ok(())
    }
}
