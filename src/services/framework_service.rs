use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::entities::framework_selections as selections;
use crate::domain::{parse_value, PathClarity, ProjectSize};
use crate::errors::{CoreError, CoreResult};
use crate::frameworks;
use crate::services::require_project;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SaveFrameworkSelection {
    #[serde(default)]
    pub framework_codes: Vec<String>,
    #[serde(default)]
    pub project_size: Option<ProjectSize>,
    #[serde(default)]
    pub path_clarity: Option<PathClarity>,
}

/// Stored selection plus the recommendation for its size and clarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSelectionResponse {
    pub project_id: Uuid,
    pub framework_codes: Vec<String>,
    pub project_size: Option<ProjectSize>,
    pub path_clarity: Option<PathClarity>,
    pub recommended: Vec<String>,
}

impl FrameworkSelectionResponse {
    fn empty(project_id: Uuid) -> Self {
        Self {
            project_id,
            framework_codes: Vec::new(),
            project_size: None,
            path_clarity: None,
            recommended: Vec::new(),
        }
    }

    fn from_model(model: &selections::Model) -> CoreResult<Self> {
        let project_size = model
            .project_size
            .as_deref()
            .map(|raw| parse_value::<ProjectSize>("projectSize", raw))
            .transpose()?;
        let path_clarity = model
            .path_clarity
            .as_deref()
            .map(|raw| parse_value::<PathClarity>("pathClarity", raw))
            .transpose()?;

        Ok(Self {
            project_id: model.project_id,
            framework_codes: model.codes(),
            project_size,
            path_clarity,
            recommended: recommendation(project_size, path_clarity),
        })
    }
}

fn recommendation(size: Option<ProjectSize>, clarity: Option<PathClarity>) -> Vec<String> {
    match (size, clarity) {
        (Some(size), Some(clarity)) => frameworks::recommend(size, clarity)
            .iter()
            .map(|code| code.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Clone)]
pub struct FrameworkService {
    db: DatabaseConnection,
}

impl FrameworkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_selection(&self, project_id: Uuid) -> CoreResult<FrameworkSelectionResponse> {
        require_project(&self.db, project_id).await?;

        match self.find(project_id).await? {
            Some(model) => FrameworkSelectionResponse::from_model(&model),
            None => Ok(FrameworkSelectionResponse::empty(project_id)),
        }
    }

    /// Replace the project's selection. Unknown framework codes are rejected.
    pub async fn save_selection(
        &self,
        project_id: Uuid,
        input: SaveFrameworkSelection,
    ) -> CoreResult<FrameworkSelectionResponse> {
        require_project(&self.db, project_id).await?;

        let mut codes: Vec<String> = Vec::with_capacity(input.framework_codes.len());
        for code in input.framework_codes {
            let code = code.trim().to_lowercase();
            if !frameworks::is_known(&code) {
                return Err(CoreError::invalid_field(
                    "frameworkCodes",
                    format!("unknown framework '{}'", code),
                ));
            }
            if !codes.contains(&code) {
                codes.push(code);
            }
        }

        let now = chrono::Utc::now();
        let model = match self.find(project_id).await? {
            Some(existing) => {
                let mut active: selections::ActiveModel = existing.into();
                active.framework_codes = Set(serde_json::json!(codes));
                active.project_size = Set(input.project_size.map(|s| s.to_string()));
                active.path_clarity = Set(input.path_clarity.map(|c| c.to_string()));
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                selections::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    project_id: Set(project_id),
                    framework_codes: Set(serde_json::json!(codes)),
                    project_size: Set(input.project_size.map(|s| s.to_string())),
                    path_clarity: Set(input.path_clarity.map(|c| c.to_string())),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| CoreError::database("save framework selection", e))?;

        FrameworkSelectionResponse::from_model(&model)
    }

    async fn find(&self, project_id: Uuid) -> CoreResult<Option<selections::Model>> {
        selections::Entity::find()
            .filter(selections::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load framework selection", e))
    }
}
