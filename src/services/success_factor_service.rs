use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};

use crate::database::entities::success_factors;
use crate::errors::{CoreError, CoreResult};
use crate::legacy_ids::{canonical_factor_id, is_legacy_id};

#[derive(Clone)]
pub struct SuccessFactorService {
    db: DatabaseConnection,
}

impl SuccessFactorService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<success_factors::Model>> {
        success_factors::Entity::find()
            .order_by_asc(success_factors::Column::Position)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list success factors", e))
    }

    /// Accepts either the UUID id or a legacy `sf-N` slug.
    pub async fn get(&self, id: &str) -> CoreResult<success_factors::Model> {
        find_factor(&self.db, id)
            .await?
            .ok_or_else(|| CoreError::not_found("SuccessFactor", id))
    }
}

/// Look a factor up by its stored id, falling back to the UUID a legacy
/// slug maps to (or the other way round for databases not yet migrated).
pub async fn find_factor<C>(db: &C, id: &str) -> CoreResult<Option<success_factors::Model>>
where
    C: ConnectionTrait,
{
    let found = success_factors::Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(|e| CoreError::database("load success factor", e))?;
    if found.is_some() || !is_legacy_id(id) {
        return Ok(found);
    }

    success_factors::Entity::find_by_id(canonical_factor_id(id))
        .one(db)
        .await
        .map_err(|e| CoreError::database("load success factor", e))
}
