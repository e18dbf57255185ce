use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::database::entities::personal_heuristics;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CreateHeuristic, UpdateHeuristic};

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/heuristics",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Personal heuristics", body = [PersonalHeuristic]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_heuristics(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<personal_heuristics::Model>>> {
    Ok(Json(state.heuristics.list(project_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/heuristics",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = CreateHeuristic,
    responses(
        (status = 201, description = "Heuristic created", body = PersonalHeuristic),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_heuristic(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateHeuristic>,
) -> ApiResult<(StatusCode, Json<personal_heuristics::Model>)> {
    let heuristic = state.heuristics.create(project_id, payload).await?;
    Ok((StatusCode::CREATED, Json(heuristic)))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/heuristics/{heuristic_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("heuristic_id" = Uuid, Path, description = "Heuristic ID")
    ),
    request_body = UpdateHeuristic,
    responses(
        (status = 200, description = "Heuristic updated", body = PersonalHeuristic),
        (status = 404, description = "Heuristic not found")
    )
)]
pub async fn update_heuristic(
    State(state): State<AppState>,
    Path((project_id, heuristic_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateHeuristic>,
) -> ApiResult<Json<personal_heuristics::Model>> {
    Ok(Json(
        state
            .heuristics
            .update(project_id, heuristic_id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/heuristics/{heuristic_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("heuristic_id" = Uuid, Path, description = "Heuristic ID")
    ),
    responses(
        (status = 204, description = "Heuristic and its tasks deleted"),
        (status = 404, description = "Heuristic not found")
    )
)]
pub async fn delete_heuristic(
    State(state): State<AppState>,
    Path((project_id, heuristic_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.heuristics.delete(project_id, heuristic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
