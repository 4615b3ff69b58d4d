use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::launches::{DEFAULT_FLIGHT_NUMBER, DEFAULT_IMPORT_CLAIM_LEASE_SECONDS, SPACEX_API_URL};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MISSION_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Directory holding the JSON document store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_launches_api_url")]
    pub launches_api_url: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Age after which an unfinished launch import claim is taken over
    #[serde(default = "default_import_claim_lease_seconds")]
    pub import_claim_lease_seconds: u64,

    /// Flight number reported while no launch has been stored yet
    #[serde(default = "default_flight_number")]
    pub default_flight_number: u32,

    #[serde(default = "default_planets_csv")]
    pub planets_csv: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_launches_api_url() -> String {
    SPACEX_API_URL.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_import_claim_lease_seconds() -> u64 {
    DEFAULT_IMPORT_CLAIM_LEASE_SECONDS
}

fn default_flight_number() -> u32 {
    DEFAULT_FLIGHT_NUMBER
}

fn default_planets_csv() -> PathBuf {
    PathBuf::from("data/kepler_data.csv")
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            data_dir: default_data_dir(),
            launches_api_url: default_launches_api_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
            import_claim_lease_seconds: default_import_claim_lease_seconds(),
            default_flight_number: default_flight_number(),
            planets_csv: default_planets_csv(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: BackendConfig =
            toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Load the config file once for the whole process.
///
/// A missing file falls back to the defaults; a file that exists but
/// fails to parse is an error.
pub fn read_config() -> anyhow::Result<&'static BackendConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = if std::path::Path::new(&path).exists() {
        BackendConfig::from_file(&path)?
    } else {
        tracing::warn!("Config file {} not found, using defaults", path);
        BackendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BackendConfig::from_toml("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_flight_number, 100);
        assert_eq!(config.import_claim_lease_seconds, 600);
        assert_eq!(config.server_address(), "0.0.0.0:8000");
        assert_eq!(
            config.launches_api_url,
            "https://api.spacexdata.com/v4/launches/query"
        );
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = BackendConfig::from_toml(
            r#"
            port = 9000
            log_level = "debug"
            data_dir = "/var/lib/mission"
            default_flight_number = 200
            import_claim_lease_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/mission"));
        assert_eq!(config.default_flight_number, 200);
        assert_eq!(config.import_claim_lease_seconds, 30);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(BackendConfig::from_toml("port = \"not a port\"").is_err());
    }
}
