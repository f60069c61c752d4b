//! Credential Store 구현
//!
//! 비밀번호 검증은 항상 bcrypt 비교를 거칩니다. 레코드가 없을 때도 더미 해시와
//! 비교해서 계정 존재 여부가 응답 시간으로 드러나지 않게 합니다.

use crate::auth::PasswordHasher;
use crate::error::{Error, Result};
use crate::models::{AuthRequest, AuthUpdateRequest, CredentialRecord};

use super::repository::CredentialRepository;

/// 인증 정보 저장소 + 비밀번호 해시기
pub struct CredentialStore<R> {
    repo: R,
    hasher: PasswordHasher,
}

impl<R: CredentialRepository> CredentialStore<R> {
    pub fn new(repo: R, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 새 인증 정보 생성
    pub async fn create(&self, request: &AuthRequest) -> Result<CredentialRecord> {
        let password_hash = self.hasher.hash(&request.password).await?;
        let record = CredentialRecord {
            lookup_hash: request.lookup_hash.clone(),
            password_hash,
        };

        self.repo.insert(&record).await?;
        tracing::debug!(lookup_hash = %record.lookup_hash, "credential created");
        Ok(record)
    }

    /// 비밀번호 검증
    ///
    /// 일치하면 비교에 사용한 저장 해시를 돌려줍니다.
    pub async fn verify(&self, lookup_hash: &str, password: &str) -> Result<Option<String>> {
        match self.repo.find(lookup_hash).await? {
            Some(record) => {
                if self.hasher.verify(password, &record.password_hash).await {
                    Ok(Some(record.password_hash))
                } else {
                    Ok(None)
                }
            }
            None => {
                self.hasher.verify_dummy(password).await;
                Ok(None)
            }
        }
    }

    /// 비밀번호 비교
    ///
    /// 불일치와 레코드 없음은 모두 `false`입니다. 저장소 장애만 에러로 올라갑니다.
    pub async fn compare(&self, request: &AuthRequest) -> Result<bool> {
        Ok(self
            .verify(&request.lookup_hash, &request.password)
            .await?
            .is_some())
    }

    /// 비밀번호 변경
    ///
    /// 기존 비밀번호가 맞아야 하며, 검증에 쓴 해시가 그대로일 때만 교체합니다.
    pub async fn update(&self, request: &AuthUpdateRequest) -> Result<()> {
        let current_hash = self
            .verify(&request.lookup_hash, &request.old_password)
            .await?
            .ok_or(Error::InvalidCredential)?;

        let new_hash = self.hasher.hash(&request.new_password).await?;
        self.repo
            .update_hash(&request.lookup_hash, &current_hash, &new_hash)
            .await?;

        tracing::debug!(lookup_hash = %request.lookup_hash, "credential updated");
        Ok(())
    }

    /// 인증 정보 삭제 (멱등)
    pub async fn delete(&self, lookup_hash: &str) -> Result<()> {
        self.repo.delete(lookup_hash).await?;
        tracing::debug!(lookup_hash = %lookup_hash, "credential deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::{MAX_PASSWORD_BYTES, MIN_COST};
    use crate::credential::MemoryCredentialRepository;
    use crate::error::PersistenceError;

    type StoreResult<T> = std::result::Result<T, PersistenceError>;

    fn store() -> CredentialStore<MemoryCredentialRepository> {
        CredentialStore::new(
            MemoryCredentialRepository::new(),
            PasswordHasher::new(MIN_COST).unwrap(),
        )
    }

    fn request(lookup: &str, password: &str) -> AuthRequest {
        AuthRequest {
            id: 42,
            lookup_hash: lookup.to_string(),
            password: password.to_string(),
        }
    }

    fn update(lookup: &str, old: &str, new: &str) -> AuthUpdateRequest {
        AuthUpdateRequest {
            id: 42,
            lookup_hash: lookup.to_string(),
            old_password: old.to_string(),
            new_password: new.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_compare() {
        let store = store();
        let record = store.create(&request("u1", "correct-horse")).await.unwrap();

        assert_eq!(record.lookup_hash, "u1");
        assert_ne!(record.password_hash, "correct-horse");
        assert!(store.compare(&request("u1", "correct-horse")).await.unwrap());
        assert!(!store.compare(&request("u1", "wrong")).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_unknown_identity() {
        let store = store();
        assert!(!store.compare(&request("ghost", "anything")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_create_keeps_first_hash() {
        let store = store();
        let first = store.create(&request("u1", "first")).await.unwrap();

        let err = store.create(&request("u1", "second")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Persistence(PersistenceError::DuplicateIdentity)
        ));

        let stored = store.repository().find("u1").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, first.password_hash);
        assert!(store.compare(&request("u1", "first")).await.unwrap());
        assert!(!store.compare(&request("u1", "second")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_too_long_password() {
        let store = store();
        let long = "p".repeat(100);
        let err = store.create(&request("u1", &long)).await.unwrap_err();

        assert!(matches!(err, Error::Hashing { .. }));
        assert!(store.repository().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_update_with_correct_old_password() {
        let store = store();
        store.create(&request("u1", "old-pass")).await.unwrap();

        store.update(&update("u1", "old-pass", "new-pass")).await.unwrap();

        assert!(store.compare(&request("u1", "new-pass")).await.unwrap());
        assert!(!store.compare(&request("u1", "old-pass")).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_with_wrong_old_password_is_noop() {
        let store = store();
        let original = store.create(&request("u1", "original")).await.unwrap();

        let err = store.update(&update("u1", "wrong", "hijacked")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredential));

        let stored = store.repository().find("u1").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, original.password_hash);
        assert!(store.compare(&request("u1", "original")).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_unknown_identity() {
        let store = store();
        let err = store.update(&update("ghost", "a", "b")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredential));
    }

    /// `find` 직후 다른 요청이 해시를 한 번 바꿔치기하는 저장소
    struct RacingRepository {
        inner: MemoryCredentialRepository,
        intruder_hash: String,
        raced: AtomicBool,
    }

    #[async_trait]
    impl CredentialRepository for RacingRepository {
        async fn insert(&self, record: &CredentialRecord) -> StoreResult<()> {
            self.inner.insert(record).await
        }

        async fn find(&self, lookup_hash: &str) -> StoreResult<Option<CredentialRecord>> {
            let found = self.inner.find(lookup_hash).await?;
            if let Some(record) = &found {
                if !self.raced.swap(true, Ordering::SeqCst) {
                    self.inner
                        .update_hash(lookup_hash, &record.password_hash, &self.intruder_hash)
                        .await?;
                }
            }
            Ok(found)
        }

        async fn update_hash(
            &self,
            lookup_hash: &str,
            expected_hash: &str,
            new_hash: &str,
        ) -> StoreResult<()> {
            self.inner.update_hash(lookup_hash, expected_hash, new_hash).await
        }

        async fn delete(&self, lookup_hash: &str) -> StoreResult<()> {
            self.inner.delete(lookup_hash).await
        }
    }

    #[tokio::test]
    async fn test_update_loses_race() {
        let hasher = PasswordHasher::new(MIN_COST).unwrap();
        let intruder_hash = hasher.hash("intruder-pass").await.unwrap();

        let inner = MemoryCredentialRepository::new();
        inner
            .insert(&CredentialRecord {
                lookup_hash: "u1".to_string(),
                password_hash: hasher.hash("old-pass").await.unwrap(),
            })
            .await
            .unwrap();

        let store = CredentialStore::new(
            RacingRepository {
                inner,
                intruder_hash: intruder_hash.clone(),
                raced: AtomicBool::new(false),
            },
            hasher,
        );

        let err = store
            .update(&update("u1", "old-pass", "new-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(PersistenceError::Conflict)));

        let stored = store.repository().inner.find("u1").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, intruder_hash);
        assert!(store.compare(&request("u1", "intruder-pass")).await.unwrap());
        assert!(!store.compare(&request("u1", "new-pass")).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_with_too_long_new_password_is_noop() {
        let store = store();
        let original = store.create(&request("u1", "original")).await.unwrap();

        let long = "n".repeat(MAX_PASSWORD_BYTES + 1);
        let err = store.update(&update("u1", "original", &long)).await.unwrap_err();
        assert!(matches!(err, Error::Hashing { .. }));

        let stored = store.repository().find("u1").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, original.password_hash);
        assert!(store.compare(&request("u1", "original")).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_at_length_limit() {
        let store = store();
        let exact = "a".repeat(MAX_PASSWORD_BYTES);
        store.create(&request("u1", &exact)).await.unwrap();

        assert!(store.compare(&request("u1", &exact)).await.unwrap());
        assert!(!store
            .compare(&request("u1", &format!("{exact}-DIFFERENT")))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_rejects_old_password_past_limit() {
        let store = store();
        let exact = "a".repeat(MAX_PASSWORD_BYTES);
        let original = store.create(&request("u1", &exact)).await.unwrap();

        let err = store
            .update(&update("u1", &format!("{exact}-DIFFERENT"), "hijacked"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredential));

        let stored = store.repository().find("u1").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, original.password_hash);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = store();
        store.create(&request("u1", "pw")).await.unwrap();

        store.delete("u1").await.unwrap();
        store.delete("u1").await.unwrap();
        assert!(!store.compare(&request("u1", "pw")).await.unwrap());
    }
}
