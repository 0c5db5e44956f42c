use crate::error::{ConfigErrorKind, InfraError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which backing store holds the item catalog (and accounts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Category directories of `<id>.json` files
    Tree,
    /// One directory of `<id>.json` files
    Flat,
    /// Postgres JSONB documents
    Document,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(StoreKind::Tree),
            "flat" => Ok(StoreKind::Flat),
            "document" | "postgres" => Ok(StoreKind::Document),
            other => Err(format!("unknown store kind {other:?} (expected tree, flat or document)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_addr: String,        // e.g. "0.0.0.0:3000"
    pub item_store: StoreKind,
    pub items_dir: PathBuf,       // e.g. "data/items"
    pub accounts_dir: PathBuf,    // e.g. "data/accounts"
    pub database_url: Option<String>, // required for StoreKind::Document
    pub cors_origin: String,      // "*" allows any origin
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:3000".to_string(),
            item_store: StoreKind::Tree,
            items_dir: PathBuf::from("data/items"),
            accounts_dir: PathBuf::from("data/accounts"),
            database_url: None,
            cors_origin: "*".to_string(),
            request_timeout_ms: 30_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let config_err = |source| InfraError::Config {
            path: path.to_path_buf(),
            source,
        };

        let data = std::fs::read_to_string(path).map_err(|e| config_err(ConfigErrorKind::Read(e)))?;
        let cfg: Self = toml::from_str(&data).map_err(|e| config_err(ConfigErrorKind::Parse(e)))?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self, InfraError> {
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, InfraError> {
        let defaults = Self::default();
        let env_path = PathBuf::from(".env");
        let invalid = |key: &str, msg: String| InfraError::Config {
            path: env_path.clone(),
            source: ConfigErrorKind::InvalidEnv(key.to_string(), msg),
        };

        let host = get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid("SERVER_PORT", e.to_string()))?,
            None => 3000,
        };

        let item_store = match get("ITEM_STORE") {
            Some(raw) => raw.parse::<StoreKind>().map_err(|e| invalid("ITEM_STORE", e))?,
            None => defaults.item_store,
        };

        let request_timeout_ms = match get("REQUEST_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| invalid("REQUEST_TIMEOUT_MS", e.to_string()))?,
            None => defaults.request_timeout_ms,
        };

        let cfg = Self {
            http_addr: format!("{host}:{port}"),
            item_store,
            items_dir: get("ITEMS_DIR").map(PathBuf::from).unwrap_or(defaults.items_dir),
            accounts_dir: get("ACCOUNTS_DIR").map(PathBuf::from).unwrap_or(defaults.accounts_dir),
            database_url: get("DATABASE_URL"),
            cors_origin: get("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            request_timeout_ms,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        cfg.validate(&env_path)?;
        Ok(cfg)
    }

    fn validate(&self, path: &Path) -> Result<(), InfraError> {
        if self.item_store == StoreKind::Document && self.database_url.is_none() {
            return Err(InfraError::Config {
                path: path.to_path_buf(),
                source: ConfigErrorKind::MissingEnv("DATABASE_URL".to_string()),
            });
        }
        Ok(())
    }
}
