//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain and persistence errors to HTTP status codes and the JSON
//! error body `{error, details?}`. Internal error messages are logged but
//! never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON error response body. All error responses use this shape.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Additional context, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Request validation failed (400). Never reaches the evaluators.
    #[error("{0}")]
    Validation(String),

    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Authentication failure (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Conflict with existing state, e.g. duplicate registration (409).
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Persistence and other internal failures are logged for the
        // operator; the client sees a generic message.
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                "服务器内部错误".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Persistence failures surface as 500s and are not retried.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain validation errors surface as 400s.
impl From<esglens_core::ValidationError> for AppError {
    fn from(err: esglens_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let (status, body) = response_parts(AppError::Validation("分析ID不能为空".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "分析ID不能为空");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = response_parts(AppError::NotFound("分析结果不存在".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "分析结果不存在");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let (status, _) = response_parts(AppError::Unauthorized("无效的用户名或密码".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn conflict_maps_to_409() {
        let (status, _) = response_parts(AppError::Conflict("用户名或电子邮件已被注册".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("db connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body.error.contains("db connection"),
            "internal details must not leak: {}",
            body.error
        );
    }

    #[test]
    fn error_body_skips_absent_details() {
        let body = ErrorBody {
            error: "规则不存在".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}
