//! /auth/* 핸들러
//!
//! 비즈니스 실패도 200과 응답 봉투로 돌려줍니다. 요청 본문을 해석할 수 없을 때만
//! `ServiceError`가 됩니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;

use sma_core::auth::bearer_token;
use sma_core::models::{AckResponse, AuthRequest, AuthResponse, AuthUpdateRequest};

use crate::error::{Result, ServiceError};
use crate::state::AppState;

/// 삭제 요청 본문
#[derive(Debug, Deserialize)]
pub struct DeleteAuthRequest {
    pub lookup_hash: String,
}

/// 갱신 요청 본문 (Authorization 헤더가 없을 때)
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /auth/create
pub async fn create_auth(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.auth.create_auth(request).await))
}

/// POST /auth/update
pub async fn update_auth(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthUpdateRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.auth.update_auth(request).await))
}

/// POST /auth/delete
pub async fn delete_auth(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DeleteAuthRequest>, JsonRejection>,
) -> Result<Json<AckResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.auth.delete_auth(&request.lookup_hash).await))
}

/// POST /auth/compare
pub async fn compare_auth(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.auth.compare_auth(request).await))
}

/// POST /auth/refresh
///
/// `Authorization: Bearer` 헤더를 우선하고, 없으면 본문의 `token`을 씁니다.
pub async fn refresh_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AuthResponse>> {
    let token = refresh_token_from(&headers, &body)?;
    Ok(Json(state.auth.refresh_auth(&token)))
}

fn refresh_token_from(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if let Some(token) = bearer_token(header) {
        return Ok(token.to_string());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::BadRequest {
            message: "missing bearer token".to_string(),
        });
    }

    let request: RefreshRequest =
        serde_json::from_slice(body).map_err(|_| ServiceError::BadRequest {
            message: "request body does not match the expected shape".to_string(),
        })?;
    Ok(request.token)
}
