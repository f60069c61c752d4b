//! Credential Store
//!
//! `lookup_hash`로 식별되는 비밀번호 해시 레코드의 생성/변경/삭제/비교를 담당합니다.
//! 저장소는 `CredentialRepository` 뒤에 숨겨져 있으며, 코어는 SQL을 알지 못합니다.

mod repository;
mod store;

pub use repository::{CredentialRepository, MemoryCredentialRepository};
pub use store::CredentialStore;
