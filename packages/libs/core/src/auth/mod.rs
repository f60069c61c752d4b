//! 인증 관련 타입 및 로직
//!
//! # 구성
//!
//! - **password**: bcrypt 기반 비밀번호 해시/비교
//! - **claims**: Access Token 페이로드
//! - **token**: 서명 설정, 토큰 발급/검증/갱신

mod claims;
mod password;
mod token;

pub use claims::{TokenClaims, ISSUER};
pub use password::{PasswordHasher, MAX_COST, MAX_PASSWORD_BYTES, MIN_COST};
pub use token::{bearer_token, now_unix, SigningConfig, SigningKeys, TokenIssuer};
