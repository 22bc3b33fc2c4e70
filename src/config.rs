use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Session signing secret used when nothing is configured. Not safe outside development.
pub const FALLBACK_SECRET_KEY: &str = "dev-secret-key";

pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const GOOGLE_MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub provider: ProviderConfig,

    pub maps: MapsConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/weather.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    /// Whether to set the Secure flag on session cookies.
    /// Enable when the app is served over HTTPS.
    pub secure_cookies: bool,

    /// Flash messages live in the session; it expires after this much inactivity.
    pub session_expiry_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            secure_cookies: false,
            session_expiry_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,

    pub units: String,

    /// Per-request timeout in seconds (default: 15)
    pub request_timeout_seconds: u64,

    /// OpenWeatherMap key. Usually supplied through `OPENWEATHER_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            units: "metric".to_string(),
            request_timeout_seconds: 15,
            api_key: None,
        }
    }
}

impl ProviderConfig {
    /// The API key, treating an empty value as unset.
    #[must_use]
    pub fn configured_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MapsConfig {
    /// Google Maps embed key, passed through to the results page.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets from the process environment win over the config file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(OPENWEATHER_API_KEY_ENV) {
            self.provider.api_key = Some(key);
        }
        if let Some(key) = non_empty(GOOGLE_MAPS_API_KEY_ENV) {
            self.maps.api_key = Some(key);
        }
        if let Some(secret) = non_empty(SECRET_KEY_ENV) {
            self.security.secret_key = Some(secret);
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("weatherlog").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".weatherlog").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("general.database_path cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.provider.request_timeout_seconds == 0 {
            anyhow::bail!("provider.request_timeout_seconds must be > 0");
        }

        Ok(())
    }

    /// The session signing secret, falling back to an insecure development value.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        match self.security.secret_key.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("No {SECRET_KEY_ENV} configured, using insecure development secret");
                FALLBACK_SECRET_KEY
            }
        }
    }

    #[must_use]
    pub fn maps_key(&self) -> Option<&str> {
        self.maps.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.request_timeout_seconds, 15);
        assert_eq!(config.provider.units, "metric");
        assert_eq!(config.server.port, 5000);
        assert!(config.provider.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_skips_secrets() {
        let mut config = Config::default();
        config.provider.api_key = Some("owm-secret".to_string());
        config.security.secret_key = Some("signing-secret".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[provider]"));
        assert!(!toml_str.contains("owm-secret"));
        assert!(!toml_str.contains("signing-secret"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [provider]
            request_timeout_seconds = 30
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.provider.request_timeout_seconds, 30);
        assert_eq!(
            config.provider.base_url,
            "https://api.openweathermap.org/data/2.5"
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (OPENWEATHER_API_KEY_ENV, "abc"),
            (GOOGLE_MAPS_API_KEY_ENV, ""),
            (SECRET_KEY_ENV, "s3cret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.provider.api_key.as_deref(), Some("abc"));
        assert!(config.maps_key().is_none());
        assert_eq!(config.secret_key(), "s3cret");
    }

    #[test]
    fn test_secret_key_fallback() {
        let config = Config::default();
        assert_eq!(config.secret_key(), FALLBACK_SECRET_KEY);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.provider.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_provider_key_is_unset() {
        let mut provider = ProviderConfig::default();
        assert_eq!(provider.configured_key(), None);

        provider.api_key = Some(String::new());
        assert_eq!(provider.configured_key(), None);

        provider.api_key = Some("abc".to_string());
        assert_eq!(provider.configured_key(), Some("abc"));
    }
}
