//! 토큰 Claims
//!
//! 발급되는 Access Token의 페이로드 구조입니다.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 이 서비스가 발급한 토큰의 `iss` 값
pub const ISSUER: &str = "simple-micro-auth";

/// Access Token Claims
///
/// 모든 시각은 epoch seconds입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (호출자가 넘긴 사용자 ID)
    pub id: i64,

    /// 같은 초에 발급된 토큰끼리 충돌하지 않게 하는 값 (보안 비밀 아님)
    #[serde(rename = "rand")]
    pub nonce: i64,

    /// 발급 시각
    pub iat: i64,

    /// 유효 시작 시각
    pub nbf: i64,

    /// 만료 시각
    pub exp: i64,

    /// 발급자
    pub iss: String,
}

impl TokenClaims {
    /// 새 claims 생성
    pub fn new(id: i64, now: i64, ttl_seconds: i64, issuer: &str) -> Self {
        Self {
            id,
            nonce: rand::thread_rng().gen_range(0..i64::MAX),
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl_seconds),
            iss: issuer.to_string(),
        }
    }

    /// 만료 여부 확인 (`exp` 시각부터 만료)
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// 아직 유효 시작 전인지 확인
    pub fn is_premature(&self, now: i64) -> bool {
        now < self.nbf
    }

    /// `[nbf, exp)` 구간에 있는지 확인
    pub fn is_active(&self, now: i64) -> bool {
        !self.is_premature(now) && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_window() {
        let claims = TokenClaims::new(42, 1_000, 60, ISSUER);

        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.nbf, 1_000);
        assert_eq!(claims.exp, 1_060);
        assert!(claims.exp > claims.iat);
        assert!(claims.nbf <= claims.iat);

        assert!(claims.is_active(1_000));
        assert!(claims.is_active(1_059));
        assert!(claims.is_expired(1_060));
        assert!(claims.is_premature(999));
    }

    #[test]
    fn test_nonce_differs() {
        let a = TokenClaims::new(1, 0, 10, ISSUER);
        let b = TokenClaims::new(1, 0, 10, ISSUER);
        assert!(a.nonce >= 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wire_names() {
        let claims = TokenClaims::new(7, 100, 10, ISSUER);
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["iss"], ISSUER);
        assert!(value.get("rand").is_some());
        assert!(value.get("nonce").is_none());
    }
}
