//! Process configuration, read from the environment (and `.env`) once at
//! startup.

use anyhow::{bail, Context};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::{DEFAULT_TOKEN_TTL_MINUTES, MAX_BCRYPT_COST, MAX_TOKEN_TTL_MINUTES, MIN_BCRYPT_COST};

/// Placeholder secret used when `JWT_SECRET` is unset. Refused when
/// `APP_ENV=production`.
pub const INSECURE_DEFAULT_SECRET: &str = "CHANGE_ME_IN_PROD";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_DATA_DIR: &str = "auth_data";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub token_ttl_minutes: i64,
    /// Raw `DATABASE_URL`; the sled directory when set.
    pub database_url: Option<String>,
    pub bcrypt_cost: u32,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Absent keys take their default;
    /// present but unparseable values are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| INSECURE_DEFAULT_SECRET.into());
        if jwt_secret == INSECURE_DEFAULT_SECRET {
            let env_mode = var("APP_ENV").or_else(|| var("RUST_ENV")).unwrap_or_default();
            if env_mode == "production" {
                bail!("JWT_SECRET is still the insecure placeholder; set a real secret before running in production");
            }
        }

        let jwt_algorithm = match var("JWT_ALGORITHM") {
            Some(raw) => Algorithm::from_str(raw.trim())
                .map_err(|_| anyhow::anyhow!("JWT_ALGORITHM {raw:?} is not a known algorithm"))?,
            None => Algorithm::HS256,
        };
        if !matches!(jwt_algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            bail!("JWT_ALGORITHM must be an HMAC algorithm (HS256, HS384, HS512), got {jwt_algorithm:?}");
        }

        let token_ttl_minutes = parse_or(var("JWT_EXPIRE_MINUTES"), "JWT_EXPIRE_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            bail!("JWT_EXPIRE_MINUTES must be within 1..={MAX_TOKEN_TTL_MINUTES}, got {token_ttl_minutes}");
        }

        let bcrypt_cost = parse_or(var("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be within {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}, got {bcrypt_cost}");
        }

        let bind_addr = var("APP_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("APP_BIND_ADDR {bind_addr:?} is not a socket address"))?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_algorithm,
            token_ttl_minutes,
            database_url: var("DATABASE_URL"),
            bcrypt_cost,
            log_dir: var("LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn token_ttl(&self) -> anyhow::Result<Duration> {
        Duration::try_minutes(self.token_ttl_minutes)
            .with_context(|| format!("JWT_EXPIRE_MINUTES {} is out of range", self.token_ttl_minutes))
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEFAULT_SECRET
    }

    pub fn database_url_set(&self) -> bool {
        self.database_url.is_some()
    }

    /// Directory holding the sled database.
    pub fn data_dir(&self) -> PathBuf {
        self.database_url
            .as_deref()
            .map(|url| url.strip_prefix("sled://").unwrap_or(url))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.uses_insecure_secret());
        assert!(!config.database_url_set());
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cr3t"),
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_EXPIRE_MINUTES", "5"),
            ("DATABASE_URL", "sled:///var/lib/hena"),
            ("BCRYPT_COST", "4"),
            ("APP_BIND_ADDR", "0.0.0.0:9000"),
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cr3t");
        assert!(!config.uses_insecure_secret());
        assert_eq!(config.jwt_algorithm, Algorithm::HS512);
        assert_eq!(config.token_ttl_minutes, 5);
        assert!(config.database_url_set());
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/hena"));
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_insecure_secret_refused_in_production() {
        assert!(config_from(&[("APP_ENV", "production")]).is_err());
        assert!(config_from(&[("APP_ENV", "production"), ("JWT_SECRET", "real")]).is_ok());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("JWT_ALGORITHM", "RS256")]).is_err());
        assert!(config_from(&[("JWT_ALGORITHM", "nope")]).is_err());
        assert!(config_from(&[("JWT_EXPIRE_MINUTES", "soon")]).is_err());
        assert!(config_from(&[("JWT_EXPIRE_MINUTES", "0")]).is_err());
        assert!(config_from(&[("BCRYPT_COST", "2")]).is_err());
        assert!(config_from(&[("APP_BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        assert!(config_from(&[("JWT_EXPIRE_MINUTES", "1000000000000")]).is_err());
        let max = i64::MAX.to_string();
        assert!(config_from(&[("JWT_EXPIRE_MINUTES", max.as_str())]).is_err());

        let year = MAX_TOKEN_TTL_MINUTES.to_string();
        let config = config_from(&[("JWT_EXPIRE_MINUTES", year.as_str())]).unwrap();
        assert_eq!(config.token_ttl().unwrap(), Duration::minutes(MAX_TOKEN_TTL_MINUTES));
        assert_eq!(config_from(&[]).unwrap().token_ttl().unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("JWT_SECRET", "  "), ("DATABASE_URL", "")]).unwrap();
        assert!(config.uses_insecure_secret());
        assert!(!config.database_url_set());
    }
}
