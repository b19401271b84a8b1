//! API 错误体与领域错误到 HTTP 状态码的翻译
//!
//! 响应体固定为 `{code, message}`。存储错误的细节只进日志，
//! 客户端只看到通用的 internal error。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED", message)
    }

    pub fn already_logged_in() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "ALREADY_LOGGED_IN",
            "a valid session cookie is already present",
        )
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "TOO_MANY_REQUESTS",
            "rate limit exceeded",
        )
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match &error {
            DomainError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", error.to_string())
            }
            DomainError::AlreadyExists { .. } => {
                ApiError::new(StatusCode::CONFLICT, "ALREADY_EXISTS", error.to_string())
            }
            DomainError::InvalidFields { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_FIELDS",
                error.to_string(),
            ),
            DomainError::InvalidValues { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_VALUES",
                error.to_string(),
            ),
            // 验证流程子状态正常情况下在 auth 路由里以 200 返回；
            // 落到这里说明出现在了意料之外的路径
            DomainError::InvalidCode | DomainError::ZeroAttempts | DomainError::CodeExpired => {
                ApiError::new(StatusCode::BAD_REQUEST, "VERIFICATION_FAILED", error.to_string())
            }
            DomainError::Unauthorized => ApiError::unauthorized("authentication required"),
            DomainError::Forbidden => {
                ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", "operation not allowed")
            }
            DomainError::Timeout => {
                ApiError::new(StatusCode::REQUEST_TIMEOUT, "TIMEOUT", "operation timed out")
            }
            DomainError::TooManyRequests => ApiError::too_many_requests(),
            DomainError::Storage { op, message } => {
                tracing::error!(op, message, "storage error");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
