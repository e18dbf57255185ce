use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::database::entities::success_factor_ratings as ratings;
use crate::errors::{CoreError, CoreResult, RatingError};
use crate::services::{double_option, find_factor, require_project, ValidationService};

/// Body of the rating upsert. Posting the same factor twice updates the
/// existing rating instead of creating a second one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpsertRating {
    pub factor_id: String,
    pub resonance: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateRating {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resonance: Option<i32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub notes: Option<Option<String>>,
}

#[derive(Clone)]
pub struct RatingService {
    db: DatabaseConnection,
}

impl RatingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, project_id: Uuid) -> CoreResult<Vec<ratings::Model>> {
        require_project(&self.db, project_id).await?;

        ratings::Entity::find()
            .filter(ratings::Column::ProjectId.eq(project_id))
            .order_by_asc(ratings::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list ratings", e))
    }

    pub async fn upsert(&self, project_id: Uuid, input: UpsertRating) -> CoreResult<ratings::Model> {
        let resonance = ValidationService::validate_resonance(input.resonance)?;
        let notes = ValidationService::validate_text("notes", input.notes.as_deref())?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        require_project(&txn, project_id).await?;
        let factor = find_factor(&txn, &input.factor_id)
            .await?
            .ok_or_else(|| RatingError::UnknownFactor(input.factor_id.clone()))?;

        let existing = ratings::Entity::find()
            .filter(ratings::Column::ProjectId.eq(project_id))
            .filter(ratings::Column::FactorId.eq(factor.id.clone()))
            .one(&txn)
            .await
            .map_err(|e| CoreError::database("load rating", e))?;

        let now = chrono::Utc::now();
        let rating = match existing {
            Some(rating) => {
                let mut active: ratings::ActiveModel = rating.into();
                active.resonance = Set(resonance);
                active.notes = Set(notes);
                active.updated_at = Set(now);
                active.update(&txn).await
            }
            None => {
                ratings::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    project_id: Set(project_id),
                    factor_id: Set(factor.id.clone()),
                    resonance: Set(resonance),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
            }
        }
        .map_err(|e| CoreError::database("save rating", e))?;

        txn.commit()
            .await
            .map_err(|e| CoreError::database("commit rating", e))?;

        debug!(
            "Project {} rated factor {} at {}",
            project_id, rating.factor_id, rating.resonance
        );
        Ok(rating)
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        rating_id: Uuid,
        input: UpdateRating,
    ) -> CoreResult<ratings::Model> {
        let rating = self.find(project_id, rating_id).await?;
        let mut active: ratings::ActiveModel = rating.into();

        if let Some(resonance) = input.resonance {
            active.resonance = Set(ValidationService::validate_resonance(resonance)?);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(ValidationService::validate_text("notes", notes.as_deref())?);
        }
        active.updated_at = Set(chrono::Utc::now());

        active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("update rating", e))
    }

    pub async fn delete(&self, project_id: Uuid, rating_id: Uuid) -> CoreResult<()> {
        let result = ratings::Entity::delete_many()
            .filter(ratings::Column::Id.eq(rating_id))
            .filter(ratings::Column::ProjectId.eq(project_id))
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::database("delete rating", e))?;

        if result.rows_affected == 0 {
            return Err(RatingError::NotFound(rating_id).into());
        }
        Ok(())
    }

    async fn find(&self, project_id: Uuid, rating_id: Uuid) -> CoreResult<ratings::Model> {
        ratings::Entity::find_by_id(rating_id)
            .filter(ratings::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load rating", e))?
            .ok_or_else(|| RatingError::NotFound(rating_id).into())
    }
}
