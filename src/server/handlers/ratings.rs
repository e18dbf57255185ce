use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::database::entities::success_factor_ratings;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{UpdateRating, UpsertRating};

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/success-factor-ratings",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Ratings of the project", body = [SuccessFactorRating]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<success_factor_ratings::Model>>> {
    Ok(Json(state.ratings.list(project_id).await?))
}

/// Create or replace the project's rating for a factor.
#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/success-factor-ratings",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = UpsertRating,
    responses(
        (status = 200, description = "Stored rating", body = SuccessFactorRating),
        (status = 400, description = "Resonance outside 1-5 or unknown factor"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn upsert_rating(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpsertRating>,
) -> ApiResult<Json<success_factor_ratings::Model>> {
    Ok(Json(state.ratings.upsert(project_id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/success-factor-ratings/{rating_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("rating_id" = Uuid, Path, description = "Rating ID")
    ),
    request_body = UpdateRating,
    responses(
        (status = 200, description = "Updated rating", body = SuccessFactorRating),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn update_rating(
    State(state): State<AppState>,
    Path((project_id, rating_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateRating>,
) -> ApiResult<Json<success_factor_ratings::Model>> {
    Ok(Json(
        state.ratings.update(project_id, rating_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/success-factor-ratings/{rating_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("rating_id" = Uuid, Path, description = "Rating ID")
    ),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    Path((project_id, rating_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.ratings.delete(project_id, rating_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
