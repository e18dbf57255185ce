use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", schema(as = SuccessFactorRating))]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "success_factor_ratings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub factor_id: String,
    /// 1 (weak) to 5 (strong)
    pub resonance: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_delete = "Cascade"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::success_factors::Entity",
        from = "Column::FactorId",
        to = "super::success_factors::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SuccessFactors,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::success_factors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SuccessFactors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
