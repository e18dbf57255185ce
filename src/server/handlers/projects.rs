use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::entities::projects;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CreateProject, UpdateProject};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    /// Only projects owned by this user
    pub user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Projects, most recently updated first", body = [Project])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<Vec<projects::Model>>> {
    Ok(Json(state.projects.list(query.user_id.as_deref()).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created with an empty plan", body = Project),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProject>,
) -> ApiResult<(StatusCode, Json<projects::Model>)> {
    let project = state.projects.create(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<projects::Model>> {
    Ok(Json(state.projects.get(project_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProject,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> ApiResult<Json<projects::Model>> {
    Ok(Json(state.projects.update(project_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project and all of its data deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.projects.delete(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
