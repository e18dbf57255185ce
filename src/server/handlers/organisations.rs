use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::database::entities::{organisations, projects};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CreateOrganisation, CreateProject};

#[utoipa::path(
    get,
    path = "/api/organisations",
    responses(
        (status = 200, description = "All organisations", body = [Organisation])
    )
)]
pub async fn list_organisations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<organisations::Model>>> {
    Ok(Json(state.organisations.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/organisations",
    request_body = CreateOrganisation,
    responses(
        (status = 201, description = "Organisation created", body = Organisation),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_organisation(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganisation>,
) -> ApiResult<(StatusCode, Json<organisations::Model>)> {
    let organisation = state.organisations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

#[utoipa::path(
    get,
    path = "/api/organisations/{organisation_id}",
    params(("organisation_id" = Uuid, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Organisation found", body = Organisation),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn get_organisation(
    State(state): State<AppState>,
    Path(organisation_id): Path<Uuid>,
) -> ApiResult<Json<organisations::Model>> {
    Ok(Json(state.organisations.get(organisation_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/organisations/{organisation_id}",
    params(("organisation_id" = Uuid, Path, description = "Organisation ID")),
    responses(
        (status = 204, description = "Organisation and its projects deleted"),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn delete_organisation(
    State(state): State<AppState>,
    Path(organisation_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.organisations.delete(organisation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/organisations/{organisation_id}/projects",
    params(("organisation_id" = Uuid, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Projects of the organisation", body = [Project]),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn list_organisation_projects(
    State(state): State<AppState>,
    Path(organisation_id): Path<Uuid>,
) -> ApiResult<Json<Vec<projects::Model>>> {
    Ok(Json(
        state.projects.list_for_organisation(organisation_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/organisations/{organisation_id}/projects",
    params(("organisation_id" = Uuid, Path, description = "Organisation ID")),
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created with an empty plan", body = Project),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn create_organisation_project(
    State(state): State<AppState>,
    Path(organisation_id): Path<Uuid>,
    Json(mut payload): Json<CreateProject>,
) -> ApiResult<(StatusCode, Json<projects::Model>)> {
    payload.organisation_id = Some(organisation_id);
    let project = state.projects.create(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}
