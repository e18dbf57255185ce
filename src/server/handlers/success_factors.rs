use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::database::entities::success_factors;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[utoipa::path(
    get,
    path = "/api/success-factors",
    responses(
        (status = 200, description = "The success factor catalog in display order", body = [SuccessFactor])
    )
)]
pub async fn list_success_factors(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<success_factors::Model>>> {
    Ok(Json(state.success_factors.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/success-factors/{factor_id}",
    params(("factor_id" = String, Path, description = "Factor UUID or legacy sf-N id")),
    responses(
        (status = 200, description = "Success factor", body = SuccessFactor),
        (status = 404, description = "Unknown factor")
    )
)]
pub async fn get_success_factor(
    State(state): State<AppState>,
    Path(factor_id): Path<String>,
) -> ApiResult<Json<success_factors::Model>> {
    Ok(Json(state.success_factors.get(&factor_id).await?))
}
