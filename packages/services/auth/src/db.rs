//! SQLite 인증 정보 저장소
//!
//! 테이블은 `auth(lookup_hash PRIMARY KEY, password_hash)` 하나입니다.
//! 모든 연산은 단일 SQL 문으로 끝나며, 비밀번호 변경은 이전 해시를 조건으로 거는
//! 조건부 UPDATE입니다.

use std::path::Path as FsPath;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use sma_core::credential::CredentialRepository;
use sma_core::models::CredentialRecord;
use sma_core::PersistenceError;

type StoreResult<T> = std::result::Result<T, PersistenceError>;

#[derive(Clone)]
pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    /// 풀 생성 + 테이블 초기화
    pub async fn connect(db_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = if let Some(path) = db_url.strip_prefix("sqlite:///") {
            let abs_path = FsPath::new("/").join(path);
            if let Some(parent) = abs_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            SqliteConnectOptions::new()
                .filename(abs_path)
                .create_if_missing(true)
        } else if let Some(path) = db_url.strip_prefix("sqlite://") {
            if let Some(parent) = FsPath::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        } else {
            SqliteConnectOptions::from_str(db_url)?.create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// 기존 풀로 생성
    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        let repo = Self { pool };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS auth (
                lookup_hash TEXT NOT NULL PRIMARY KEY,
                password_hash TEXT NOT NULL
            );"#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("auth table exists or created");
        Ok(())
    }

    async fn exists(&self, lookup_hash: &str) -> StoreResult<bool> {
        let row = sqlx::query_scalar::<_, i64>(r#"SELECT 1 FROM auth WHERE lookup_hash = ?1"#)
            .bind(lookup_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(row.is_some())
    }
}

/// sqlx 에러를 저장소 에러로 변환
///
/// 원문은 로그로만 남기고 호출자에게는 일반 메시지를 전달합니다.
fn backend_error(err: sqlx::Error) -> PersistenceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return PersistenceError::DuplicateIdentity;
        }
    }

    tracing::error!("Database error: {:?}", err);
    PersistenceError::Backend {
        message: "database operation failed".to_string(),
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn insert(&self, record: &CredentialRecord) -> StoreResult<()> {
        sqlx::query(r#"INSERT INTO auth (lookup_hash, password_hash) VALUES (?1, ?2)"#)
            .bind(&record.lookup_hash)
            .bind(&record.password_hash)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn find(&self, lookup_hash: &str) -> StoreResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, (String, String)>(
            r#"SELECT lookup_hash, password_hash FROM auth WHERE lookup_hash = ?1"#,
        )
        .bind(lookup_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(row.map(|(lookup_hash, password_hash)| CredentialRecord {
            lookup_hash,
            password_hash,
        }))
    }

    async fn update_hash(
        &self,
        lookup_hash: &str,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE auth SET password_hash = ?1 WHERE lookup_hash = ?2 AND password_hash = ?3"#,
        )
        .bind(new_hash)
        .bind(lookup_hash)
        .bind(expected_hash)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        if self.exists(lookup_hash).await? {
            Err(PersistenceError::Conflict)
        } else {
            Err(PersistenceError::NotFound)
        }
    }

    async fn delete(&self, lookup_hash: &str) -> StoreResult<()> {
        sqlx::query(r#"DELETE FROM auth WHERE lookup_hash = ?1"#)
            .bind(lookup_hash)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}
