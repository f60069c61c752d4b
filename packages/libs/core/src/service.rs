//! 인증 서비스
//!
//! Credential Store와 Token Issuer를 묶어 응답 봉투(`AuthResponse`)로 변환합니다.
//! 비즈니스 실패는 모두 `error` 필드로 전달되며 호출자에게 예외로 던지지 않습니다.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::credential::{CredentialRepository, CredentialStore};
use crate::error::Error;
use crate::models::{AckResponse, AuthRequest, AuthResponse, AuthUpdateRequest};

/// 인증 서비스
pub struct AuthService<R> {
    store: Arc<CredentialStore<R>>,
    tokens: Arc<TokenIssuer>,
}

impl<R> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<R: CredentialRepository> AuthService<R> {
    pub fn new(store: Arc<CredentialStore<R>>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    pub fn store(&self) -> &CredentialStore<R> {
        &self.store
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// 인증 정보 생성 후 토큰 발급
    pub async fn create_auth(&self, request: AuthRequest) -> AuthResponse {
        if let Err(e) = self.store.create(&request).await {
            log_failure("create", &request.lookup_hash, &e);
            return AuthResponse::failure(request.id, "", e.client_message());
        }
        self.mint(request.id)
    }

    /// 비밀번호 변경 후 토큰 발급
    pub async fn update_auth(&self, request: AuthUpdateRequest) -> AuthResponse {
        if let Err(e) = self.store.update(&request).await {
            log_failure("update", &request.lookup_hash, &e);
            return AuthResponse::failure(request.id, "", e.client_message());
        }
        self.mint(request.id)
    }

    /// 인증 정보 삭제
    pub async fn delete_auth(&self, lookup_hash: &str) -> AckResponse {
        match self.store.delete(lookup_hash).await {
            Ok(()) => AckResponse::ok(),
            Err(e) => {
                log_failure("delete", lookup_hash, &e);
                AckResponse::failure(e.client_message())
            }
        }
    }

    /// 비밀번호 비교 후 토큰 발급
    pub async fn compare_auth(&self, request: AuthRequest) -> AuthResponse {
        match self.store.compare(&request).await {
            Ok(true) => self.mint(request.id),
            Ok(false) => {
                let e = Error::InvalidCredential;
                log_failure("compare", &request.lookup_hash, &e);
                AuthResponse::failure(request.id, "", e.client_message())
            }
            Err(e) => {
                log_failure("compare", &request.lookup_hash, &e);
                AuthResponse::failure(request.id, "", e.client_message())
            }
        }
    }

    /// 토큰 갱신
    pub fn refresh_auth(&self, token: &str) -> AuthResponse {
        self.tokens.refresh(token)
    }

    fn mint(&self, id: i64) -> AuthResponse {
        match self.tokens.issue(id) {
            Ok(token) => AuthResponse::success(id, token),
            Err(e) => {
                tracing::error!(id, code = e.code(), error = %e, "failed to sign token");
                AuthResponse::failure(id, "", e.client_message())
            }
        }
    }
}

fn log_failure(operation: &'static str, lookup_hash: &str, err: &Error) {
    if err.status_code() < 500 {
        tracing::warn!(operation, lookup_hash = %lookup_hash, code = err.code(), "auth request rejected");
    } else {
        tracing::error!(operation, lookup_hash = %lookup_hash, code = err.code(), error = %err, "auth request failed");
    }
}
