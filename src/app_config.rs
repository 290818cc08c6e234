use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "kube-config-merge";

/// Persistent defaults, read from `config.toml` in the user's config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultConfig {
    /// Prefix applied when `--prefix` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Overwrite existing entries even without `--override`.
    #[serde(default, rename = "override")]
    pub override_existing: bool,
    /// Back up the target before writing even without `--backup`.
    #[serde(default)]
    pub backup: bool,
}

impl AppConfig {
    /// Load the application configuration from the default path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Unable to determine the config directory
    /// - Unable to read the config file (other than it not existing)
    /// - The config file contains invalid TOML
    pub fn load() -> Result<Option<Self>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config at {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Get the path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if unable to determine the config directory
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
            Ok(PathBuf::from(config_home).join(APP_NAME).join("config.toml"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            anyhow::bail!("Could not determine config directory")
        }
    }

    #[must_use]
    pub fn default_prefix(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.prefix.as_deref())
    }

    #[must_use]
    pub fn override_existing(&self) -> bool {
        self.defaults.as_ref().is_some_and(|d| d.override_existing)
    }

    #[must_use]
    pub fn backup(&self) -> bool {
        self.defaults.as_ref().is_some_and(|d| d.backup)
    }
}
