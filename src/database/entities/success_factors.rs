use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry. `id` is a UUID string; databases created before the id
/// migration still hold `sf-N` slugs until `migrate-legacy-ids` runs.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", schema(as = SuccessFactor))]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "success_factors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::success_factor_ratings::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::personal_heuristics::Entity")]
    Heuristics,
}

impl Related<super::success_factor_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::personal_heuristics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Heuristics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
