//! sma-core: simple-micro-auth 핵심 라이브러리
//!
//! 전송 계층과 무관한 인증 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 비밀번호 해시, 토큰 claims, 토큰 발급/검증
//! - `credential`: 인증 정보 저장소 인터페이스와 Credential Store
//! - `service`: 응답 봉투를 만드는 서비스 façade
//! - `models`: 요청/응답/레코드 타입
//! - `error`: 공통 에러 타입

pub mod auth;
pub mod credential;
pub mod error;
pub mod models;
pub mod service;

pub use error::{Error, PersistenceError, Result};
pub use service::AuthService;
