//! HTTP 핸들러

pub mod auth;
pub mod health;

use axum::http::Uri;

use crate::error::ServiceError;

/// 등록되지 않은 경로
pub async fn not_found(uri: Uri) -> ServiceError {
    ServiceError::NotFound {
        message: format!("no route for {}", uri.path()),
    }
}
