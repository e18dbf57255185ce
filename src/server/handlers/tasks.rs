use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::database::entities::project_tasks;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CreateTask, TaskFilter, UpdateTask};

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/tasks",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        TaskFilter
    ),
    responses(
        (status = 200, description = "Tasks matching the filters", body = [ProjectTask]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<project_tasks::Model>>> {
    Ok(Json(state.tasks.list(project_id, filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/tasks",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = ProjectTask),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "The source already has 3 tasks in this stage")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<project_tasks::Model>)> {
    let task = state.tasks.create(project_id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Serves both PUT and PATCH; only the fields present are changed.
#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/tasks/{task_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated", body = ProjectTask),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Target stage is full for this source")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateTask>,
) -> ApiResult<Json<project_tasks::Model>> {
    Ok(Json(state.tasks.update(project_id, task_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/tasks/{task_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(project_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
