//! Configuration Loader
//!
//! Precedence (highest to lowest):
//! 1. Command-line overrides (applied by the caller)
//! 2. Environment variables
//! 3. Config file (explicit path, else the first standard location found)
//! 4. Default values

use std::path::{Path, PathBuf};
use tracing::debug;

use super::DeployConfig;
use crate::constants::env_vars;
use crate::error::{DeployError, Result};

const SENSITIVE_PATTERNS: [&str; 4] = ["password", "secret", "token", "credential"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file and environment.
    ///
    /// Not validated here: command-line overrides still apply on top, so callers run
    /// [`DeployConfig::validate`] once every layer is in place.
    pub fn load(explicit_path: Option<&Path>) -> Result<DeployConfig> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => {
                    debug!("Loading config from: {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => DeployConfig::default(),
            },
        };

        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

        debug!(
            "Loaded deployer configuration: {}",
            serde_json::to_string(&Self::sanitize_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<DeployConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::config_error(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            DeployError::config_error(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut candidates = vec![
            PathBuf::from("./nifi-deploy.toml"),
            PathBuf::from("./config/nifi-deploy.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("nifi-deploy").join("config.toml"));
        }

        candidates.into_iter().find(|path| path.is_file())
    }

    /// Apply environment variable overrides through `lookup`
    pub fn apply_env_overrides<F>(config: &mut DeployConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(env_vars::URL) {
            config.nifi.base_url = url;
        }
        if let Some(username) = lookup(env_vars::USERNAME) {
            config.nifi.username = Some(username);
        }
        if let Some(password) = lookup(env_vars::PASSWORD) {
            config.nifi.password = Some(password);
        }
        if let Some(interval) = lookup(env_vars::INTERVAL_MS) {
            config.lifecycle.interval_ms = Self::parse_millis(env_vars::INTERVAL_MS, &interval)?;
        }
        if let Some(timeout) = lookup(env_vars::TIMEOUT_MS) {
            config.lifecycle.timeout_ms = Self::parse_millis(env_vars::TIMEOUT_MS, &timeout)?;
        }
        Ok(())
    }

    fn parse_millis(name: &str, value: &str) -> Result<u64> {
        value.trim().parse().map_err(|e| {
            DeployError::config_error(format!("Invalid {name} value '{value}': {e}"))
        })
    }

    /// JSON view of the configuration with secrets masked
    pub fn sanitize_for_logging(config: &DeployConfig) -> serde_json::Value {
        let mut value = serde_json::json!(config);
        Self::sanitize_json_recursive(&mut value);
        value
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = SENSITIVE_PATTERNS
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive && !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    } else {
                        Self::sanitize_json_recursive(val);
                    }
                }
            }
            serde_json::Value::Array(items) => {
                for item in items.iter_mut() {
                    Self::sanitize_json_recursive(item);
                }
            }
            _ => {}
        }
    }
}
