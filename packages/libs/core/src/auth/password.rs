//! 비밀번호 해시
//!
//! bcrypt 기반의 솔트 + 가변 비용 해시입니다. bcrypt는 CPU를 오래 점유하므로
//! 모든 연산은 `spawn_blocking` 위에서 실행됩니다.

use rand::{distributions::Alphanumeric, Rng};

use crate::error::{Error, Result};

/// bcrypt가 사용하는 최대 입력 길이 (바이트)
pub const MAX_PASSWORD_BYTES: usize = 72;

/// 허용되는 bcrypt cost 범위
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// 비밀번호 해시기
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,

    /// 존재하지 않는 계정에 대해 비교할 더미 해시
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// 새 해시기 생성
    ///
    /// cost가 bcrypt 허용 범위를 벗어나면 `Error::Config`를 반환합니다.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(Error::Config {
                message: format!("bcrypt cost must be within {MIN_COST}..={MAX_COST}, got {cost}"),
            });
        }

        let filler: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = bcrypt::hash(filler, cost).map_err(|e| Error::Config {
            message: format!("bcrypt self-test failed: {e}"),
        })?;

        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// 비밀번호 해시 생성
    pub async fn hash(&self, password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::Hashing {
                reason: format!("password exceeds {MAX_PASSWORD_BYTES} bytes"),
            });
        }

        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| Error::Hashing {
                reason: format!("hashing task failed: {e}"),
            })?
            .map_err(|e| Error::Hashing {
                reason: e.to_string(),
            })
    }

    /// 저장된 해시와 비밀번호 비교
    ///
    /// bcrypt의 자체 비교 루틴을 사용합니다. 해시 파싱 실패도 불일치로 취급합니다.
    /// bcrypt는 72바이트 이후를 잘라내므로 그보다 긴 입력은 비교 없이 불일치입니다.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// 레코드가 없을 때 실제 비교와 비슷한 시간을 소모
    pub async fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash).await;
    }
}
