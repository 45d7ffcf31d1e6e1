//! Server configuration loaded from environment variables.
//!
//! - `PAWNHUB_HOST` - Bind address (default: 0.0.0.0)
//! - `PAWNHUB_PORT` - Listen port (default: 3000)
//! - `PAWNHUB_DB_PATH` - SQLite file for users, and for the catalog when
//!   `PAWNHUB_STORAGE=sqlite` (default: pawnhub.db)
//! - `PAWNHUB_JWT_SECRET` - Token signing secret (default: dev secret)
//! - `PAWNHUB_STORAGE` - Catalog backend, `sqlite` or `local` (default: sqlite)
//! - `PAWNHUB_LOCAL_DIR` - Directory for the JSON catalog files (default: pawnhub-local)
//! - `PAWNHUB_MERGE_POLICY` - `skip-blank` or `explicit` (default: skip-blank)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use pawnhub_services::MergePolicy;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Local,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub local_dir: PathBuf,
    pub merge_policy: MergePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let invalid = |key: &str, e: &dyn std::fmt::Display| {
            ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
        };

        let host = get("PAWNHUB_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| invalid("PAWNHUB_HOST", &e))?;
        let port = get("PAWNHUB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| invalid("PAWNHUB_PORT", &e))?;

        let storage = match get("PAWNHUB_STORAGE", "sqlite").as_str() {
            "sqlite" => StorageBackend::Sqlite,
            "local" => StorageBackend::Local,
            other => {
                return Err(invalid(
                    "PAWNHUB_STORAGE",
                    &format!("expected sqlite or local, got {:?}", other),
                ));
            }
        };

        let merge_policy = get("PAWNHUB_MERGE_POLICY", "skip-blank")
            .parse::<MergePolicy>()
            .map_err(|e| invalid("PAWNHUB_MERGE_POLICY", &e))?;

        Ok(Self {
            host,
            port,
            db_path: PathBuf::from(get("PAWNHUB_DB_PATH", "pawnhub.db")),
            jwt_secret: get("PAWNHUB_JWT_SECRET", DEV_JWT_SECRET),
            storage,
            local_dir: PathBuf::from(get("PAWNHUB_LOCAL_DIR", "pawnhub-local")),
            merge_policy,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
