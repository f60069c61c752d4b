//! 앱 상태

use std::sync::Arc;

use sma_core::auth::{PasswordHasher, TokenIssuer};
use sma_core::credential::{CredentialRepository, CredentialStore, MemoryCredentialRepository};
use sma_core::AuthService;

use crate::config::Config;
use crate::db::SqliteCredentialRepository;

/// 핸들러가 공유하는 저장소 타입
pub type SharedRepository = Arc<dyn CredentialRepository>;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 인증 서비스
    pub auth: AuthService<SharedRepository>,
}

impl AppState {
    /// 새 상태 생성
    ///
    /// 서명 키, bcrypt cost, DB 연결 중 하나라도 잘못되면 시작하지 않습니다.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let tokens = TokenIssuer::from_config(&config.signing, config.token_ttl)?;

        let repo: SharedRepository = match &config.database_url {
            Some(url) => {
                let repo = SqliteCredentialRepository::connect(url, config.db_max_connections).await?;
                tracing::info!("Connected to credential database");
                Arc::new(repo)
            }
            None => {
                tracing::warn!("SMA_DATABASE_URL not set, credentials are kept in memory only");
                Arc::new(MemoryCredentialRepository::new())
            }
        };

        let store = CredentialStore::new(repo, hasher);
        Ok(Self {
            config: config.clone(),
            auth: AuthService::new(Arc::new(store), Arc::new(tokens)),
        })
    }
}
