//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use vertcut_common::VertcutError;

/// Wrapper turning crate errors into HTTP responses: 404 for unknown
/// jobs, 400 for bad input, 500 otherwise.
pub struct ApiError(pub VertcutError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            VertcutError::JobNotFound { .. } => StatusCode::NOT_FOUND,
            err if err.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "Request failed");
        } else {
            tracing::debug!(%status, error = %message, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<VertcutError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Shorthand for multipart decode failures.
pub fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(VertcutError::validation(format!(
        "malformed multipart body: {err}"
    )))
}
