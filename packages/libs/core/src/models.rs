//! 요청/응답 및 저장 레코드 타입
//!
//! `AuthResponse`는 성공/실패와 무관하게 `id`, `token`, `error` 세 필드를 항상 가집니다.

use serde::{Deserialize, Serialize};

/// 저장되는 인증 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// 조회 키 (생성 후 변경 불가)
    pub lookup_hash: String,

    /// bcrypt 해시
    pub password_hash: String,
}

/// 생성/비교 요청
#[derive(Clone, Deserialize)]
pub struct AuthRequest {
    /// 토큰 subject로 쓰이는 사용자 ID
    pub id: i64,

    pub lookup_hash: String,

    /// 평문 비밀번호 (저장/로그 금지)
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("id", &self.id)
            .field("lookup_hash", &self.lookup_hash)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// 비밀번호 변경 요청
#[derive(Clone, Deserialize)]
pub struct AuthUpdateRequest {
    pub id: i64,
    pub lookup_hash: String,
    pub old_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for AuthUpdateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthUpdateRequest")
            .field("id", &self.id)
            .field("lookup_hash", &self.lookup_hash)
            .field("old_password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

impl AuthUpdateRequest {
    /// 기존 비밀번호 검증용 요청으로 변환
    pub fn as_compare_request(&self) -> AuthRequest {
        AuthRequest {
            id: self.id,
            lookup_hash: self.lookup_hash.clone(),
            password: self.old_password.clone(),
        }
    }
}

/// 응답 봉투
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: i64,

    /// 실패 시 빈 문자열 (갱신 실패 시에는 입력 토큰)
    pub token: String,

    /// 성공 시 빈 문자열
    pub error: String,
}

impl AuthResponse {
    pub fn success(id: i64, token: impl Into<String>) -> Self {
        Self {
            id,
            token: token.into(),
            error: String::new(),
        }
    }

    pub fn failure(id: i64, token: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id,
            token: token.into(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

/// 삭제 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    pub error: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
