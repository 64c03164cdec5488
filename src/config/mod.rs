//! # Deployer Configuration
//!
//! Connection settings for the NiFi REST API and the polling parameters used by the
//! lifecycle sequencer. Loaded from TOML by [`ConfigLoader`] with environment variable
//! and command-line overrides on top.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nifi_deploy::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(None)?;
//! println!("NiFi at {} polling every {:?}", config.nifi.base_url, config.lifecycle.interval());
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::BRANCH_SEPARATOR;
use crate::error::{DeployError, Result};

pub use loader::ConfigLoader;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// NiFi REST API connection
    pub nifi: NifiApiConfig,
    /// State-transition polling
    pub lifecycle: LifecycleConfig,
}

/// Connection settings for the NiFi REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NifiApiConfig {
    /// Base URL including the API prefix (e.g., "<http://localhost:8080/nifi-api>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Accept self-signed certificates on secured instances
    pub accept_invalid_certs: bool,
}

impl Default for NifiApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/nifi-api".to_string(),
            timeout_ms: 30000,
            username: None,
            password: None,
            accept_invalid_certs: false,
        }
    }
}

impl NifiApiConfig {
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Polling parameters for processor state changes and queue draining
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Wait between two attempts, in milliseconds
    pub interval_ms: u64,
    /// Overall budget for one state change or drain, in milliseconds
    pub timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            timeout_ms: 120_000,
        }
    }
}

impl LifecycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl DeployConfig {
    /// Reject values that would make every remote call or poll meaningless
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.nifi.base_url.trim().is_empty() {
            errors.push("nifi.base_url must not be empty".to_string());
        }
        if self.nifi.timeout_ms == 0 {
            errors.push("nifi.timeout_ms must be greater than zero".to_string());
        }
        if self.nifi.username.is_some() != self.nifi.password.is_some() {
            errors.push("nifi.username and nifi.password must be set together".to_string());
        }
        if self.lifecycle.interval_ms == 0 {
            errors.push("lifecycle.interval_ms must be greater than zero".to_string());
        }
        if self.lifecycle.interval_ms > self.lifecycle.timeout_ms {
            errors.push(format!(
                "lifecycle.interval_ms ({}) must not exceed lifecycle.timeout_ms ({})",
                self.lifecycle.interval_ms, self.lifecycle.timeout_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DeployError::Configuration(errors.join("; ")))
        }
    }
}

/// Split a branch written as `root>group>sub` into its segments.
///
/// The first segment names the root group. Segments are trimmed and empty ones rejected.
pub fn parse_branch(branch: &str) -> Result<Vec<String>> {
    let segments: Vec<String> = branch
        .split(BRANCH_SEPARATOR)
        .map(|segment| segment.trim().to_string())
        .collect();

    if segments.iter().any(String::is_empty) {
        return Err(DeployError::config_error(format!(
            "Invalid branch '{branch}': empty segment"
        )));
    }
    Ok(segments)
}
