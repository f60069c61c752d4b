//! 전송 계층 에러 타입
//!
//! 비즈니스 실패(비밀번호 불일치, 중복 등)는 `AuthResponse.error`로 전달되고,
//! 여기서는 요청 자체를 처리할 수 없는 경우만 다룹니다.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 서비스 에러
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        // 본문 원문은 비밀번호를 포함할 수 있으므로 메시지에 싣지 않음
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "expected application/json body",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "request body does not match the expected shape",
            _ => "failed to read request body",
        };
        ServiceError::BadRequest {
            message: message.to_string(),
        }
    }
}

impl ServiceError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ServiceError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            ServiceError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        tracing::debug!(code, %message, "request rejected");

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
