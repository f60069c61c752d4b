//! 저장소 인터페이스
//!
//! `lookup_hash`를 키로 하는 단순한 관계를 가정합니다.
//! 중복 키 삽입은 실패해야 하며 upsert는 지원하지 않습니다.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::models::CredentialRecord;

type StoreResult<T> = std::result::Result<T, PersistenceError>;

/// 인증 정보 저장소
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// 새 레코드 삽입. 같은 키가 있으면 `DuplicateIdentity`
    async fn insert(&self, record: &CredentialRecord) -> StoreResult<()>;

    /// 단건 조회
    async fn find(&self, lookup_hash: &str) -> StoreResult<Option<CredentialRecord>>;

    /// 조건부 해시 교체
    ///
    /// 현재 해시가 `expected_hash`일 때만 `new_hash`로 바꿉니다.
    /// 레코드가 없으면 `NotFound`, 해시가 달라졌으면 `Conflict`입니다.
    async fn update_hash(
        &self,
        lookup_hash: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<()>;

    /// 삭제. 없는 키를 삭제해도 성공합니다.
    async fn delete(&self, lookup_hash: &str) -> StoreResult<()>;
}

#[async_trait]
impl<T: CredentialRepository + ?Sized> CredentialRepository for Arc<T> {
    async fn insert(&self, record: &CredentialRecord) -> StoreResult<()> {
        (**self).insert(record).await
    }

    async fn find(&self, lookup_hash: &str) -> StoreResult<Option<CredentialRecord>> {
        (**self).find(lookup_hash).await
    }

    async fn update_hash(
        &self,
        lookup_hash: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<()> {
        (**self).update_hash(lookup_hash, expected_hash, new_hash).await
    }

    async fn delete(&self, lookup_hash: &str) -> StoreResult<()> {
        (**self).delete(lookup_hash).await
    }
}

/// 메모리 저장소
///
/// 테스트와 DB 없이 띄우는 개발 환경용입니다.
#[derive(Debug, Default)]
pub struct MemoryCredentialRepository {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.records.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> PersistenceError {
    PersistenceError::Backend {
        message: "credential map lock poisoned".to_string(),
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn insert(&self, record: &CredentialRecord) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if records.contains_key(&record.lookup_hash) {
            return Err(PersistenceError::DuplicateIdentity);
        }
        records.insert(record.lookup_hash.clone(), record.password_hash.clone());
        Ok(())
    }

    async fn find(&self, lookup_hash: &str) -> StoreResult<Option<CredentialRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(lookup_hash).map(|hash| CredentialRecord {
            lookup_hash: lookup_hash.to_string(),
            password_hash: hash.clone(),
        }))
    }

    async fn update_hash(
        &self,
        lookup_hash: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        match records.get_mut(lookup_hash) {
            None => Err(PersistenceError::NotFound),
            Some(current) if current != expected_hash => Err(PersistenceError::Conflict),
            Some(current) => {
                *current = new_hash.to_string();
                Ok(())
            }
        }
    }

    async fn delete(&self, lookup_hash: &str) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.remove(lookup_hash);
        Ok(())
    }
}
