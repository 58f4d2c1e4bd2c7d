//! API 错误类型与响应映射

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

use willow_llm::LlmError;
use willow_session::StoreError;

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 会话不存在
    #[error("Session not found: {0}")]
    NotFound(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// LLM 提供方错误
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SessionNotFound { id } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Llm(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: match &self {
                // 404 使用固定文案，不泄露内部 id
                ApiError::NotFound(_) => "Not found".to_string(),
                other => other.to_string(),
            },
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
