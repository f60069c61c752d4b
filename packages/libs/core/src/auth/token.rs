//! 토큰 발급 및 검증
//!
//! 서명 알고리즘은 프로세스 시작 시 `SigningConfig` 하나로 결정되고,
//! `SigningKeys`로 한 번 변환된 뒤에는 바뀌지 않습니다.
//!
//! # 검증 순서
//! 1. 헤더 디코딩
//! 2. 알고리즘이 설정된 것과 같은지 확인 (algorithm confusion 방지)
//! 3. 서명 확인
//! 4. claims 구조 확인
//! 5. issuer, nbf, exp 확인

use std::collections::HashSet;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{TokenClaims, ISSUER};
use crate::error::{Error, Result};
use crate::models::AuthResponse;

/// 서명 설정 (배포 환경에 따라 선택)
#[derive(Clone)]
pub enum SigningConfig {
    /// HS256 공유 비밀키
    Hmac { secret: Vec<u8> },

    /// RS256 키 쌍 (PEM)
    Rsa {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningConfig::Hmac { .. } => f.write_str("Hmac { secret: <redacted> }"),
            SigningConfig::Rsa { .. } => f.write_str("Rsa { private_pem: <redacted>, .. }"),
        }
    }
}

impl SigningConfig {
    /// 알고리즘
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SigningConfig::Hmac { .. } => Algorithm::HS256,
            SigningConfig::Rsa { .. } => Algorithm::RS256,
        }
    }

    /// 키 재료를 서명/검증 키로 변환
    pub fn resolve(&self) -> Result<SigningKeys> {
        let (encoding, decoding) = match self {
            SigningConfig::Hmac { secret } => {
                if secret.is_empty() {
                    return Err(Error::Config {
                        message: "HMAC secret must not be empty".to_string(),
                    });
                }
                (
                    EncodingKey::from_secret(secret),
                    DecodingKey::from_secret(secret),
                )
            }
            SigningConfig::Rsa {
                private_pem,
                public_pem,
            } => {
                let encoding = EncodingKey::from_rsa_pem(private_pem).map_err(|_| Error::Config {
                    message: "invalid RSA private key".to_string(),
                })?;
                let decoding = DecodingKey::from_rsa_pem(public_pem).map_err(|_| Error::Config {
                    message: "invalid RSA public key".to_string(),
                })?;
                (encoding, decoding)
            }
        };

        Ok(SigningKeys {
            algorithm: self.algorithm(),
            encoding,
            decoding,
        })
    }
}

/// 변환이 끝난 서명/검증 키
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

/// 토큰 발급기/검증기
///
/// 키와 기본 TTL 외에는 상태가 없으므로 `Arc`로 공유해 병렬 호출해도 됩니다.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: SigningKeys,
    issuer: String,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// 새 발급기 생성
    pub fn new(keys: SigningKeys, default_ttl: Duration) -> Self {
        Self {
            keys,
            issuer: ISSUER.to_string(),
            default_ttl,
        }
    }

    /// 설정에서 바로 생성
    pub fn from_config(config: &SigningConfig, default_ttl: Duration) -> Result<Self> {
        Ok(Self::new(config.resolve()?, default_ttl))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.keys.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// 토큰 발급
    pub fn issue_token(&self, subject_id: i64, now: i64, ttl: Duration) -> Result<String> {
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        if ttl_seconds <= 0 {
            return Err(Error::Signing {
                reason: "token ttl must be at least one second".to_string(),
            });
        }

        let claims = TokenClaims::new(subject_id, now, ttl_seconds, &self.issuer);
        jsonwebtoken::encode(&Header::new(self.keys.algorithm), &claims, &self.keys.encoding)
            .map_err(|e| Error::Signing {
                reason: e.to_string(),
            })
    }

    /// 토큰 검증 후 subject ID 반환
    ///
    /// 호출자는 `id` 외의 claim을 신뢰하지 않아야 합니다.
    pub fn verify_token(&self, token: &str, now: i64) -> Result<i64> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| Error::MalformedToken {
            reason: "unreadable header".to_string(),
        })?;

        if header.alg != self.keys.algorithm {
            return Err(Error::SigningMethodMismatch {
                expected: format!("{:?}", self.keys.algorithm),
                actual: format!("{:?}", header.alg),
            });
        }

        let mut validation = Validation::new(self.keys.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.keys.decoding, &validation)
            .map_err(|e| map_decode_error(e, self.keys.algorithm))?;
        let claims = data.claims;

        if claims.iss != self.issuer {
            return Err(Error::IssuerMismatch);
        }
        if !claims.is_active(now) {
            return Err(if claims.is_premature(now) {
                Error::NotYetValid
            } else {
                Error::Expired
            });
        }

        Ok(claims.id)
    }

    /// 토큰 갱신
    ///
    /// 검증에 실패하면 입력 토큰을 그대로 돌려주고 에러를 채웁니다.
    /// 만료된 토큰은 갱신할 수 없습니다.
    pub fn refresh_token(&self, token: &str, now: i64, ttl: Duration) -> AuthResponse {
        let id = match self.verify_token(token, now) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(code = e.code(), "refresh rejected");
                return AuthResponse::failure(0, token, e.client_message());
            }
        };

        match self.issue_token(id, now, ttl) {
            Ok(fresh) => AuthResponse::success(id, fresh),
            Err(e) => {
                tracing::error!(code = e.code(), error = %e, "failed to sign refreshed token");
                AuthResponse::failure(id, "", e.client_message())
            }
        }
    }

    /// 현재 시각과 기본 TTL로 토큰 발급
    pub fn issue(&self, subject_id: i64) -> Result<String> {
        self.issue_token(subject_id, now_unix(), self.default_ttl)
    }

    /// 현재 시각으로 토큰 검증
    pub fn verify(&self, token: &str) -> Result<i64> {
        self.verify_token(token, now_unix())
    }

    /// 현재 시각과 기본 TTL로 토큰 갱신
    pub fn refresh(&self, token: &str) -> AuthResponse {
        self.refresh_token(token, now_unix(), self.default_ttl)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error, expected: Algorithm) -> Error {
    match err.kind() {
        ErrorKind::InvalidSignature => Error::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            Error::SigningMethodMismatch {
                expected: format!("{:?}", expected),
                actual: "unknown".to_string(),
            }
        }
        ErrorKind::Json(_) => Error::MalformedToken {
            reason: "claims malformed".to_string(),
        },
        _ => Error::MalformedToken {
            reason: "invalid token".to_string(),
        },
    }
}

/// 현재 epoch seconds
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `Authorization` 헤더 값에서 Bearer 토큰 추출
pub fn bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
