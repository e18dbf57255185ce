use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::database::entities::policies;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CreatePolicy, UpdatePolicy};

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/policies",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Policies of the project", body = [Policy]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_policies(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<policies::Model>>> {
    Ok(Json(state.policies.list(project_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/policies",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = CreatePolicy,
    responses(
        (status = 201, description = "Policy created", body = Policy),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_policy(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreatePolicy>,
) -> ApiResult<(StatusCode, Json<policies::Model>)> {
    let policy = state.policies.create(project_id, payload).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/policies/{policy_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("policy_id" = Uuid, Path, description = "Policy ID")
    ),
    request_body = UpdatePolicy,
    responses(
        (status = 200, description = "Policy updated", body = Policy),
        (status = 404, description = "Policy not found")
    )
)]
pub async fn update_policy(
    State(state): State<AppState>,
    Path((project_id, policy_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePolicy>,
) -> ApiResult<Json<policies::Model>> {
    Ok(Json(
        state.policies.update(project_id, policy_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/policies/{policy_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("policy_id" = Uuid, Path, description = "Policy ID")
    ),
    responses(
        (status = 204, description = "Policy and the tasks it generated deleted"),
        (status = 404, description = "Policy not found")
    )
)]
pub async fn delete_policy(
    State(state): State<AppState>,
    Path((project_id, policy_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.policies.delete(project_id, policy_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
