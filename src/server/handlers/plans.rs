use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::entities::plans;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::ProjectProgress;

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/plan",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "The project's plan", body = Plan),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<plans::Model>> {
    Ok(Json(state.plans.get_or_create(project_id).await?))
}

/// Merge the submitted fields into one block of the plan.
#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}/plan/blocks/{block}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("block" = String, Path, description = "block1, block2 or block3")
    ),
    request_body(content = Object, description = "Block fields to merge"),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 400, description = "Unknown block or body is not an object"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn save_block(
    State(state): State<AppState>,
    Path((project_id, block)): Path<(Uuid, String)>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<plans::Model>> {
    Ok(Json(
        state.plans.save_block(project_id, &block, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/plan/progress",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Completion per block and overall", body = ProjectProgress),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectProgress>> {
    Ok(Json(state.progress.project_progress(project_id).await?))
}
