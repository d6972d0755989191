use serde::Deserialize;
use std::path::Path;
use tracing::warn;

const DATABASE_URL_ENV_KEY: &str = "CHATADMIN_DATABASE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://chatadmin.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Presentation-side settings. `utc_offset_minutes` is the fixed offset
/// applied when bucketing timestamps into display days ("today", daily
/// series); the store itself keeps everything in UTC.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub utc_offset_minutes: i64,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path`, falling back to built-in defaults when the file is
    /// missing. A malformed file is still a hard error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("no config file at {}, using defaults", path.display());
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV_KEY) {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
    }
}
