use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::entities::organisations;
use crate::errors::{CoreError, CoreResult};
use crate::services::ValidationService;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganisation {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct OrganisationService {
    db: DatabaseConnection,
}

impl OrganisationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateOrganisation) -> CoreResult<organisations::Model> {
        let name = ValidationService::validate_name("name", &input.name)?;
        let description =
            ValidationService::validate_text("description", input.description.as_deref())?;

        let mut organisation = organisations::ActiveModel::new();
        organisation.name = Set(name);
        organisation.description = Set(description);

        let organisation = organisation
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::database("create organisation", e))?;

        info!("Created organisation {} ({})", organisation.name, organisation.id);
        Ok(organisation)
    }

    pub async fn list(&self) -> CoreResult<Vec<organisations::Model>> {
        organisations::Entity::find()
            .order_by_asc(organisations::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list organisations", e))
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<organisations::Model> {
        organisations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load organisation", e))?
            .ok_or_else(|| CoreError::not_found("Organisation", id))
    }

    /// Deleting an organisation removes its projects and everything under them.
    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = organisations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::database("delete organisation", e))?;

        if result.rows_affected == 0 {
            return Err(CoreError::not_found("Organisation", id));
        }

        info!("Deleted organisation {}", id);
        Ok(())
    }
}
