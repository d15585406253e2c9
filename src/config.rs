use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{MozzieError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub status: StatusConfig,
}

/// Classification service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// WebSocket base URL of the classification service (ws:// or wss://).
    pub url: String,
    /// Connection timeout in seconds for classification sessions.
    pub connect_timeout_secs: u64,
}

/// Admin status feed configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    /// Override for the status feed URL. When unset, the feed connects to
    /// `<service.url>/updates`.
    pub url: Option<String>,
    /// Delay between reconnection attempts in milliseconds.
    pub reconnect_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: defaults::DEFAULT_SERVICE_URL.to_string(),
            connect_timeout_secs: defaults::CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            url: None,
            reconnect_delay_ms: defaults::RECONNECT_DELAY_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(MozzieError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MOZZIE_SERVICE_URL → service.url
    /// - MOZZIE_STATUS_URL → status.url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("MOZZIE_SERVICE_URL")
            && !url.is_empty()
        {
            self.service.url = url;
        }

        if let Ok(url) = std::env::var("MOZZIE_STATUS_URL")
            && !url.is_empty()
        {
            self.status.url = Some(url);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/mozzie/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mozzie")
            .join("config.toml")
    }

    /// Resolve the status feed URL.
    ///
    /// Explicit `status.url` wins; otherwise the `/updates` path on the
    /// classification service.
    pub fn status_url(&self) -> String {
        match &self.status.url {
            Some(url) => url.clone(),
            None => format!("{}/updates", self.service.url.trim_end_matches('/')),
        }
    }

    /// Look up a value by dotted key path (e.g. `service.url`).
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let value =
            toml::Value::try_from(self).map_err(|e| MozzieError::ConfigInvalidValue {
                key: key.to_string(),
                message: format!("Failed to serialize configuration: {}", e),
            })?;

        let mut current = &value;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| MozzieError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "no such key".to_string(),
                })?;
        }

        Ok(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a value by dotted key path and write the file back.
    ///
    /// The file is created (with defaults plus the new value) if it does not
    /// exist yet. The value string is parsed as TOML where possible so that
    /// numbers stay numbers; anything unparseable is stored as a string.
    pub fn set_value_by_path(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut root: toml::Value = match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                toml::Value::Table(toml::map::Map::new())
            }
            Err(e) => return Err(e.into()),
        };

        let parsed = if let Ok(i) = value.parse::<i64>() {
            toml::Value::Integer(i)
        } else if let Ok(f) = value.parse::<f64>() {
            toml::Value::Float(f)
        } else if let Ok(b) = value.parse::<bool>() {
            toml::Value::Boolean(b)
        } else {
            toml::Value::String(value.to_string())
        };

        let mut current = &mut root;
        let parts: Vec<&str> = key.split('.').collect();
        let (last, intermediate) =
            parts
                .split_last()
                .ok_or_else(|| MozzieError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "empty key".to_string(),
                })?;

        for part in intermediate {
            let table =
                current
                    .as_table_mut()
                    .ok_or_else(|| MozzieError::ConfigInvalidValue {
                        key: key.to_string(),
                        message: format!("{} is not a table", part),
                    })?;
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }

        let table = current
            .as_table_mut()
            .ok_or_else(|| MozzieError::ConfigInvalidValue {
                key: key.to_string(),
                message: "parent is not a table".to_string(),
            })?;
        table.insert(last.to_string(), parsed);

        // Validate the result still deserializes as a Config
        let rendered = toml::to_string_pretty(&root).map_err(|e| {
            MozzieError::ConfigInvalidValue {
                key: key.to_string(),
                message: format!("Failed to render configuration: {}", e),
            }
        })?;
        let _: Config = toml::from_str(&rendered)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Render the current configuration as TOML.
    pub fn dump(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MozzieError::Other(e.to_string()))
    }
}
