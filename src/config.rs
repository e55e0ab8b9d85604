use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

pub const DEFAULT_POSTS_PER_PAGE: usize = 10;
pub const DEFAULT_INDEX_CACHE_TTL_SECS: u64 = 20;
/// Large enough for a base64-encoded image of a few megabytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub page_size: NonZeroUsize,
    pub index_cache_ttl: Duration,
    pub jwt_secret: String,
    pub login_url: String,
    pub storage: StorageBackend,
    pub allowed_origins: Vec<String>,
    /// Uploaded post images are written below this directory.
    pub media_root: PathBuf,
    pub max_body_bytes: usize,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let page_size = parse_var("POSTS_PER_PAGE", DEFAULT_POSTS_PER_PAGE)?;
        let page_size = NonZeroUsize::new(page_size).context("POSTS_PER_PAGE must be positive")?;

        let storage = match env::var("STORAGE").unwrap_or_else(|_| "postgres".into()).as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE must be 'postgres' or 'memory', got '{}'", other),
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            page_size,
            index_cache_ttl: Duration::from_secs(parse_var(
                "INDEX_CACHE_TTL_SECS",
                DEFAULT_INDEX_CACHE_TTL_SECS,
            )?),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/auth/login/".into()),
            storage,
            allowed_origins,
            media_root: PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into())),
            max_body_bytes: parse_var("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);

    let mut pool_cfg = cfg.pool.take().unwrap_or_default();
    pool_cfg.max_size = parse_var("PG_POOL_SIZE", 16usize)?;
    cfg.pool = Some(pool_cfg);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}

#[cfg(test)]
impl Settings {
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            page_size: NonZeroUsize::new(DEFAULT_POSTS_PER_PAGE).unwrap(),
            index_cache_ttl: Duration::from_secs(DEFAULT_INDEX_CACHE_TTL_SECS),
            jwt_secret: "test-secret".to_string(),
            login_url: "/auth/login/".to_string(),
            storage: StorageBackend::Memory,
            allowed_origins: Vec::new(),
            media_root: env::temp_dir().join(format!("yatube-media-{}", uuid::Uuid::new_v4())),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
