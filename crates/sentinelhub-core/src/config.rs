use crate::constants::{
    BaseUrl, COVERAGE_REQUEST_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, USER_INFO_REQUEST_TIMEOUT,
};
use crate::error::{Result, ShError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the settings store, relative to the home directory
const DEFAULT_SETTINGS_FILE: &str = ".config/sentinelhub/settings.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered runtime configuration of the Sentinel Hub client
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub base_url: ConfigValue<String>,
    /// Seconds
    pub request_timeout: ConfigValue<u64>,
    /// Seconds
    pub coverage_timeout: ConfigValue<u64>,
    /// Seconds
    pub user_info_timeout: ConfigValue<u64>,
    pub settings_path: ConfigValue<PathBuf>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let settings_path = env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(DEFAULT_SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

        Self {
            base_url: ConfigValue::new(BaseUrl::MAIN.to_string(), ConfigSource::Default),
            request_timeout: ConfigValue::new(
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
                ConfigSource::Default,
            ),
            coverage_timeout: ConfigValue::new(
                COVERAGE_REQUEST_TIMEOUT.as_secs(),
                ConfigSource::Default,
            ),
            user_info_timeout: ConfigValue::new(
                USER_INFO_REQUEST_TIMEOUT.as_secs(),
                ConfigSource::Default,
            ),
            settings_path: ConfigValue::new(settings_path, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ShError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ShError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(base_url) = file_config.base_url {
            self.base_url.update(base_url, ConfigSource::File);
        }

        if let Some(timeout) = file_config.request_timeout {
            self.request_timeout.update(timeout, ConfigSource::File);
        }

        if let Some(timeout) = file_config.coverage_timeout {
            self.coverage_timeout.update(timeout, ConfigSource::File);
        }

        if let Some(timeout) = file_config.user_info_timeout {
            self.user_info_timeout.update(timeout, ConfigSource::File);
        }

        if let Some(settings_path) = file_config.settings_path {
            self.settings_path.update(settings_path, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // SH_BASE_URL
        if let Ok(base_url) = env::var("SH_BASE_URL") {
            if base_url.starts_with("http://") || base_url.starts_with("https://") {
                self.base_url.update(base_url, ConfigSource::Environment);
            } else {
                tracing::warn!("Invalid SH_BASE_URL value '{}': expected an http(s) URL", base_url);
            }
        }

        // SH_REQUEST_TIMEOUT, SH_COVERAGE_TIMEOUT, SH_USER_INFO_TIMEOUT
        for (name, value) in [
            ("SH_REQUEST_TIMEOUT", &mut self.request_timeout),
            ("SH_COVERAGE_TIMEOUT", &mut self.coverage_timeout),
            ("SH_USER_INFO_TIMEOUT", &mut self.user_info_timeout),
        ] {
            if let Ok(timeout_str) = env::var(name) {
                match parse_timeout(&timeout_str) {
                    Ok(timeout) => value.update(timeout, ConfigSource::Environment),
                    Err(_) => tracing::warn!(
                        "Invalid {} value '{}': expected a positive number of seconds",
                        name,
                        timeout_str
                    ),
                }
            }
        }

        // SH_SETTINGS_PATH
        if let Some(path) = env::var_os("SH_SETTINGS_PATH") {
            self.settings_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url.update(base_url, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.request_timeout {
            self.request_timeout.update(timeout, ConfigSource::Cli);
        }

        if let Some(settings_path) = overrides.settings_path {
            self.settings_path.update(settings_path, ConfigSource::Cli);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.value)
    }

    pub fn coverage_timeout(&self) -> Duration {
        Duration::from_secs(self.coverage_timeout.value)
    }

    pub fn user_info_timeout(&self) -> Duration {
        Duration::from_secs(self.user_info_timeout.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("base_url".to_string(), (self.base_url.value.clone(), self.base_url.source));

        map.insert(
            "request_timeout".to_string(),
            (format!("{}s", self.request_timeout.value), self.request_timeout.source),
        );

        map.insert(
            "coverage_timeout".to_string(),
            (format!("{}s", self.coverage_timeout.value), self.coverage_timeout.source),
        );

        map.insert(
            "user_info_timeout".to_string(),
            (format!("{}s", self.user_info_timeout.value), self.user_info_timeout.source),
        );

        map.insert(
            "settings_path".to_string(),
            (self.settings_path.value.display().to_string(), self.settings_path.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    base_url: Option<String>,
    request_timeout: Option<u64>,
    coverage_timeout: Option<u64>,
    user_info_timeout: Option<u64>,
    settings_path: Option<PathBuf>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub base_url: Option<String>,
    pub request_timeout: Option<u64>,
    pub settings_path: Option<PathBuf>,
}

/// Parse a timeout in whole seconds
pub fn parse_timeout(s: &str) -> Result<u64> {
    match s.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ShError::ConfigInvalid {
            key: "timeout".to_string(),
            reason: format!("Invalid timeout: {}. Use a positive number of seconds", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.base_url.value, "https://services.sentinel-hub.com");
        assert_eq!(config.base_url.source, ConfigSource::Default);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.coverage_timeout(), Duration::from_secs(10));
        assert!(config.settings_path.value.ends_with("settings.toml"));
    }

    #[test]
    fn test_base_url_precedence() {
        let mut base_url = ConfigValue::new(BaseUrl::MAIN.to_string(), ConfigSource::Default);

        base_url.update(BaseUrl::USWEST.to_string(), ConfigSource::File);
        assert_eq!(base_url.source, ConfigSource::File);

        base_url.update("https://creodias.sentinel-hub.com".to_string(), ConfigSource::Cli);
        assert_eq!(base_url.value, "https://creodias.sentinel-hub.com");

        // An environment value arriving after a flag is ignored
        base_url.update(BaseUrl::MAIN.to_string(), ConfigSource::Environment);
        assert_eq!(base_url.value, "https://creodias.sentinel-hub.com");
        assert_eq!(base_url.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://services-uswest2.sentinel-hub.com"
request_timeout = 30
settings_path = "/tmp/sh/settings.toml"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.base_url.value, BaseUrl::USWEST);
        assert_eq!(config.base_url.source, ConfigSource::File);
        assert_eq!(config.request_timeout.value, 30);
        assert_eq!(config.settings_path.value, PathBuf::from("/tmp/sh/settings.toml"));
        assert_eq!(config.coverage_timeout.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            base_url: Some("https://example.com".to_string()),
            request_timeout: None,
            settings_path: None,
        });

        assert_eq!(config.base_url.value, "https://example.com");
        assert_eq!(config.base_url.source, ConfigSource::Cli);
        assert_eq!(config.request_timeout.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("15").unwrap(), 15);
        assert_eq!(parse_timeout(" 7 ").unwrap(), 7);
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();

        assert_eq!(map.len(), 5);
        let (timeout, source) = &map["request_timeout"];
        assert_eq!(timeout, "60s");
        assert_eq!(*source, ConfigSource::Default);
    }
}
