//! HTTP error kinds and their response bodies.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every client error: `{"detail": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Human-readable reason.
    #[schema(example = "Not authenticated")]
    pub detail: String,
}

/// Body of the generic 500 response. Never carries failure internals.
#[derive(Debug, Serialize, ToSchema)]
pub struct InternalErrorBody {
    /// Always "Internal server error".
    pub error: &'static str,
    /// Always "An unexpected error occurred".
    pub message: &'static str,
}

impl InternalErrorBody {
    /// The single fixed body.
    pub const FIXED: Self = Self {
        error: "Internal server error",
        message: "An unexpected error occurred",
    };
}

/// Request-time error.
///
/// Every variant except [`ApiError::Internal`] is an expected, structured
/// outcome with its own status code. `Internal` is logged with its message and
/// answered with [`InternalErrorBody::FIXED`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or unusable credentials.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Host header not on the allow-list.
    #[error("Invalid host header")]
    InvalidHost,

    /// No route for the path.
    #[error("Not Found")]
    NotFound,

    /// Route exists but not for this method.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Anything unexpected. Handlers and the Swagger UI router return this
    /// for failures that are not one of the kinds above; the message is
    /// logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidHost => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            tracing::error!(error = %msg, "Global exception");
            return internal_error_response();
        }

        let status = self.status();
        let mut response = (
            status,
            Json(ErrorDetail {
                detail: self.to_string(),
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// The uniform 500 response.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(InternalErrorBody::FIXED),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let response = ApiError::Internal("db password is hunter2".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Internal server error",
                "message": "An unexpected error occurred"
            })
        );
    }

    #[tokio::test]
    async fn unauthorized_sets_challenge_header() {
        let response = ApiError::Unauthorized("Not authenticated").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Not authenticated");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::InvalidHost.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
