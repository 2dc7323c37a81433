use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "flatten-select.toml";
pub const ENV_PREFIX: &str = "FLATTEN_SELECT_";
/// Upper bound of `upload_ttl_days`, ten years.
pub const MAX_UPLOAD_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root under which data source files are kept.
    pub media_root: PathBuf,
    /// Root of the CSV preview cache, one sub-directory per data source.
    pub preview_root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadingsSettings {
    /// Dictionary file replacing the bundled one.
    pub dictionary_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub headings: HeadingsSettings,
    pub log_level: String,
    /// Days a registered data source stays valid.
    pub upload_ttl_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            storage: StorageSettings {
                media_root: PathBuf::from("media"),
                preview_root: PathBuf::from("media/previews"),
            },
            headings: HeadingsSettings::default(),
            log_level: "info".to_string(),
            upload_ttl_days: 2,
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Defaults, then `flatten-select.toml`, then `FLATTEN_SELECT_*` variables.
    pub fn load() -> Result<AppConfig> {
        let _ = dotenvy::dotenv();
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        if !(1..=MAX_UPLOAD_TTL_DAYS).contains(&config.upload_ttl_days) {
            return Err(AppError::ValidationError(format!(
                "upload_ttl_days must be between 1 and {}",
                MAX_UPLOAD_TTL_DAYS
            )));
        }
        Ok(config)
    }
}
