use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ghusers_common::error::GhUsersError;

const INTERNAL_MESSAGE: &str = "an internal error occurred";

pub struct ApiError(pub GhUsersError);

impl From<GhUsersError> for ApiError {
    fn from(err: GhUsersError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            GhUsersError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GhUsersError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            GhUsersError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            GhUsersError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            GhUsersError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            GhUsersError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            other => {
                tracing::error!(code = other.code(), error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
            }
        };

        let body = serde_json::json!({ "code": self.0.code(), "error": message });
        (status, Json(body)).into_response()
    }
}
