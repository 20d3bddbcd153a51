//! Configuration Store
//!
//! Handles loading/saving the TOML configuration file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::types::{PolicyConfig, RunnerConfig};

/// Unified agentplan configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Scheduler settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Default resilience policies
    #[serde(default)]
    pub policies: PolicyConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring unreadable config: {:#}", e),
                }
            }
        }
        Self::default()
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agentplan").join("config.toml"))
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        self.runner.merge(other.runner);
        self.policies.merge(other.policies);
    }

    /// Render as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::RetryConfig;

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [policies]
            timeout_ms = 1500

            [policies.retry]
            max_attempts = 4
            backoff_ms = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.runner.max_concurrency, None);
        assert_eq!(config.policies.timeout_ms, Some(1500));
        let retry = config.policies.retry.unwrap();
        assert_eq!(retry.max_attempts, 4);
        assert_eq!(retry.backoff_multiplier, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.runner.max_concurrency = Some(4);
        config.policies.retry = Some(RetryConfig {
            max_attempts: 5,
            backoff_ms: 10,
            backoff_multiplier: Some(2.0),
            max_backoff_ms: Some(200),
        });

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config::default();
        base.runner.max_concurrency = Some(2);
        base.policies.timeout_ms = Some(100);

        let mut other = Config::default();
        other.policies.timeout_ms = Some(900);

        base.merge(other);
        assert_eq!(base.runner.max_concurrency, Some(2));
        assert_eq!(base.policies.timeout_ms, Some(900));
    }
}
