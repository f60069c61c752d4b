//! 서비스 설정

use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use base64::{engine::general_purpose, Engine as _};
use sma_core::auth::SigningConfig;

/// 서비스 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// SQLite URL (없으면 메모리 저장소)
    pub database_url: Option<String>,

    /// DB 최대 커넥션 수
    pub db_max_connections: u32,

    /// bcrypt cost
    pub bcrypt_cost: u32,

    /// 토큰 TTL
    pub token_ttl: Duration,

    /// 서명 설정 (Debug 출력 시 키는 가려짐)
    pub signing: SigningConfig,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 로드
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let token_ttl = lookup("SMA_TOKEN_TTL").unwrap_or_else(|| "24h".to_string());
        let token_ttl = humantime::parse_duration(token_ttl.trim())
            .with_context(|| format!("invalid SMA_TOKEN_TTL: {token_ttl}"))?;
        if token_ttl.as_secs() == 0 {
            bail!("SMA_TOKEN_TTL must be at least one second");
        }

        Ok(Self {
            port: lookup("SMA_PORT")
                .unwrap_or_else(|| "50051".to_string())
                .parse()
                .context("invalid SMA_PORT")?,

            database_url: lookup("SMA_DATABASE_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            db_max_connections: lookup("SMA_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "8".to_string())
                .parse()
                .unwrap_or(8),

            bcrypt_cost: lookup("SMA_BCRYPT_COST")
                .unwrap_or_else(|| bcrypt_default_cost().to_string())
                .parse()
                .unwrap_or_else(|_| bcrypt_default_cost()),

            token_ttl,

            signing: signing_from_lookup(&lookup)?,
        })
    }
}

fn bcrypt_default_cost() -> u32 {
    10
}

/// 서명 알고리즘과 키 재료 로드
fn signing_from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<SigningConfig> {
    let alg = lookup("SMA_SIGNING_ALG").unwrap_or_else(|| "HS256".to_string());

    match alg.trim().to_ascii_uppercase().as_str() {
        "HS256" => {
            let raw = lookup("SMA_JWT_SECRET")
                .ok_or_else(|| anyhow!("SMA_JWT_SECRET is required for HS256"))?;
            let secret = parse_secret(&raw)?;
            if secret.is_empty() {
                bail!("SMA_JWT_SECRET must not be empty");
            }
            Ok(SigningConfig::Hmac { secret })
        }
        "RS256" => {
            let private_path = lookup("SMA_RSA_PRIVATE_KEY_PATH")
                .ok_or_else(|| anyhow!("SMA_RSA_PRIVATE_KEY_PATH is required for RS256"))?;
            let public_path = lookup("SMA_RSA_PUBLIC_KEY_PATH")
                .ok_or_else(|| anyhow!("SMA_RSA_PUBLIC_KEY_PATH is required for RS256"))?;

            let private_pem = std::fs::read(&private_path)
                .with_context(|| format!("cannot read RSA private key at {private_path}"))?;
            let public_pem = std::fs::read(&public_path)
                .with_context(|| format!("cannot read RSA public key at {public_path}"))?;

            Ok(SigningConfig::Rsa {
                private_pem,
                public_pem,
            })
        }
        other => bail!("unsupported SMA_SIGNING_ALG: {other} (expected HS256 or RS256)"),
    }
}

/// 비밀키 문자열 해석
///
/// `base64:` 접두사가 있으면 base64로 디코딩하고, 아니면 문자열 바이트를 그대로 씁니다.
fn parse_secret(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();

    if let Some(encoded) = trimmed.strip_prefix("base64:") {
        return general_purpose::STANDARD
            .decode(encoded)
            .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| anyhow!("SMA_JWT_SECRET has an invalid base64 payload"));
    }

    Ok(trimmed.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sma_core::auth::SigningConfig;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("SMA_JWT_SECRET", "secret")])).unwrap();

        assert_eq!(config.port, 50051);
        assert_eq!(config.database_url, None);
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.token_ttl, Duration::from_secs(24 * 3600));
        match config.signing {
            SigningConfig::Hmac { secret } => assert_eq!(secret, b"secret"),
            other => panic!("Expected Hmac, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SMA_PORT", "8080"),
            ("SMA_DATABASE_URL", "sqlite://data/auth.db"),
            ("SMA_BCRYPT_COST", "12"),
            ("SMA_TOKEN_TTL", "15m"),
            ("SMA_SIGNING_ALG", "hs256"),
            ("SMA_JWT_SECRET", "base64:c2VjcmV0"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("sqlite://data/auth.db"));
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.token_ttl, Duration::from_secs(900));
        match config.signing {
            SigningConfig::Hmac { secret } => assert_eq!(secret, b"secret"),
            other => panic!("Expected Hmac, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_unknown_algorithm() {
        let result = Config::from_lookup(lookup_from(&[
            ("SMA_SIGNING_ALG", "ES256"),
            ("SMA_JWT_SECRET", "secret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rs256_requires_paths() {
        let result = Config::from_lookup(lookup_from(&[("SMA_SIGNING_ALG", "RS256")]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("SMA_SIGNING_ALG", "RS256"),
            ("SMA_RSA_PRIVATE_KEY_PATH", "/nonexistent/private.pem"),
            ("SMA_RSA_PUBLIC_KEY_PATH", "/nonexistent/public.pem"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rs256_reads_key_files() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../libs/core/testdata");
        let private_path = format!("{dir}/rsa_private.pem");
        let public_path = format!("{dir}/rsa_public.pem");

        let config = Config::from_lookup(lookup_from(&[
            ("SMA_SIGNING_ALG", "RS256"),
            ("SMA_RSA_PRIVATE_KEY_PATH", private_path.as_str()),
            ("SMA_RSA_PUBLIC_KEY_PATH", public_path.as_str()),
        ]))
        .unwrap();

        assert!(matches!(config.signing, SigningConfig::Rsa { .. }));
        assert!(config.signing.resolve().is_ok());
    }

    #[test]
    fn test_invalid_ttl() {
        let result = Config::from_lookup(lookup_from(&[
            ("SMA_JWT_SECRET", "secret"),
            ("SMA_TOKEN_TTL", "forever"),
        ]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("SMA_JWT_SECRET", "secret"),
            ("SMA_TOKEN_TTL", "0s"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config =
            Config::from_lookup(lookup_from(&[("SMA_JWT_SECRET", "hunter2-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_invalid_base64_secret() {
        let result = Config::from_lookup(lookup_from(&[("SMA_JWT_SECRET", "base64:!!!")]));
        assert!(result.is_err());
    }
}
