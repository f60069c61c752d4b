//! 공통 에러 타입
//!
//! Credential Store와 Token Issuer가 공유하는 에러 타입을 정의합니다.
//! 호출자에게 돌려주는 메시지는 `client_message()`를 통해서만 만들어지며,
//! 평문 비밀번호나 서명 키는 어떤 메시지에도 포함되지 않습니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 저장소 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("duplicate identity")]
    DuplicateIdentity,

    #[error("credential not found")]
    NotFound,

    /// 검증 이후 저장된 해시가 바뀌어 조건부 쓰기가 적용되지 않음
    #[error("credential changed concurrently")]
    Conflict,

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

/// simple-micro-auth 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Credential Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("password hashing failed: {reason}")]
    Hashing { reason: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("incorrect password")]
    InvalidCredential,

    // ─────────────────────────────────────────────────────────────────────────────
    // Token Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("token signing failed: {reason}")]
    Signing { reason: String },

    #[error("invalid token or signature")]
    InvalidSignature,

    #[error("malformed token: {reason}")]
    MalformedToken { reason: String },

    #[error("unexpected signing method: expected {expected}, got {actual}")]
    SigningMethodMismatch { expected: String, actual: String },

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    // ─────────────────────────────────────────────────────────────────────────────
    // Startup Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Hashing { .. } | Error::MalformedToken { .. } => 400,

            // 401 Unauthorized
            Error::InvalidCredential
            | Error::InvalidSignature
            | Error::SigningMethodMismatch { .. }
            | Error::Expired
            | Error::NotYetValid
            | Error::IssuerMismatch => 401,

            // 404 / 409
            Error::Persistence(PersistenceError::NotFound) => 404,
            Error::Persistence(PersistenceError::DuplicateIdentity)
            | Error::Persistence(PersistenceError::Conflict) => 409,

            // 500 Internal Server Error
            _ => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::Hashing { .. } => "HASHING_ERROR",
            Error::Persistence(PersistenceError::DuplicateIdentity) => "DUPLICATE_IDENTITY",
            Error::Persistence(PersistenceError::NotFound) => "NOT_FOUND",
            Error::Persistence(PersistenceError::Conflict) => "CONFLICT",
            Error::Persistence(PersistenceError::Backend { .. }) => "PERSISTENCE_ERROR",
            Error::InvalidCredential => "INVALID_CREDENTIAL",
            Error::Signing { .. } => "SIGNING_ERROR",
            Error::InvalidSignature => "INVALID_SIGNATURE",
            Error::MalformedToken { .. } => "MALFORMED_TOKEN",
            Error::SigningMethodMismatch { .. } => "SIGNING_METHOD_MISMATCH",
            Error::Expired => "TOKEN_EXPIRED",
            Error::NotYetValid => "TOKEN_NOT_YET_VALID",
            Error::IssuerMismatch => "ISSUER_MISMATCH",
            Error::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// 토큰 검증 실패 여부
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSignature
                | Error::MalformedToken { .. }
                | Error::SigningMethodMismatch { .. }
                | Error::Expired
                | Error::NotYetValid
                | Error::IssuerMismatch
        )
    }

    /// `AuthResponse.error`에 들어갈 문자열
    ///
    /// 실패 분류만 설명합니다. 백엔드 원문 메시지는 로그로만 남깁니다.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidCredential => "Incorrect password".to_string(),
            Error::Hashing { .. } => "Problem with creating password hash".to_string(),
            Error::Persistence(PersistenceError::DuplicateIdentity) => {
                "Auth with this lookup hash already exists".to_string()
            }
            Error::Persistence(PersistenceError::NotFound) => "Auth not found".to_string(),
            Error::Persistence(PersistenceError::Conflict) => {
                "Auth was modified concurrently, retry".to_string()
            }
            Error::Persistence(PersistenceError::Backend { .. }) => {
                "Problem with auth storage".to_string()
            }
            Error::Signing { .. } => "Problem with signing token".to_string(),
            Error::Config { .. } => "Service misconfigured".to_string(),
            e if e.is_token_error() => format!("TokenError: {}", e),
            e => e.to_string(),
        }
    }
}
