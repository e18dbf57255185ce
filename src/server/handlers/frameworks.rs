use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PathClarity, ProjectSize};
use crate::frameworks::{self, Framework, FRAMEWORKS};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{FrameworkSelectionResponse, SaveFrameworkSelection};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub project_size: ProjectSize,
    pub path_clarity: PathClarity,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub project_size: ProjectSize,
    pub path_clarity: PathClarity,
    pub frameworks: Vec<Framework>,
}

#[utoipa::path(
    get,
    path = "/api/frameworks",
    responses(
        (status = 200, description = "Framework catalog", body = [Framework])
    )
)]
pub async fn list_frameworks() -> Json<Vec<Framework>> {
    Json(FRAMEWORKS.to_vec())
}

#[utoipa::path(
    get,
    path = "/api/frameworks/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Frameworks suited to the project, best first", body = RecommendationResponse),
        (status = 400, description = "Unknown size or clarity")
    )
)]
pub async fn get_recommendations(
    Query(query): Query<RecommendationQuery>,
) -> Json<RecommendationResponse> {
    let frameworks = frameworks::recommend(query.project_size, query.path_clarity)
        .iter()
        .filter_map(|code| frameworks::find(code))
        .cloned()
        .collect();

    Json(RecommendationResponse {
        project_size: query.project_size,
        path_clarity: query.path_clarity,
        frameworks,
    })
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/framework-selection",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Stored selection and recommendation", body = FrameworkSelectionResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_selection(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<FrameworkSelectionResponse>> {
    Ok(Json(state.frameworks.get_selection(project_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/framework-selection",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = SaveFrameworkSelection,
    responses(
        (status = 200, description = "Selection stored", body = FrameworkSelectionResponse),
        (status = 400, description = "Unknown framework code"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn save_selection(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<SaveFrameworkSelection>,
) -> ApiResult<Json<FrameworkSelectionResponse>> {
    Ok(Json(
        state.frameworks.save_selection(project_id, payload).await?,
    ))
}
