use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::{CoreError, CoreErrorKind};

/// Wraps a [`CoreError`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: CoreErrorKind) -> StatusCode {
    match kind {
        CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        CoreErrorKind::Validation => StatusCode::BAD_REQUEST,
        CoreErrorKind::Conflict => StatusCode::CONFLICT,
        CoreErrorKind::Forbidden => StatusCode::FORBIDDEN,
        CoreErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        CoreErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for ApiError
where
    E: Into<CoreError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let kind = err.kind();

        // internal details stay in the log
        let message = if kind == CoreErrorKind::Internal {
            error!("Internal error: {} (source: {:?})", err.message(), std::error::Error::source(&err));
            "An internal error occurred".to_string()
        } else {
            err.message().to_string()
        };

        let body = json!({
            "error": {
                "code": kind.code(),
                "message": message,
                "fields": err.fields(),
            }
        });

        (status_for(kind), Json(body)).into_response()
    }
}
