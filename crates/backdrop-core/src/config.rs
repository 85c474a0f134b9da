//! Configuration for Backdrop
//!
//! TOML file, optional: every field has a default and a missing file means
//! all defaults.
//!
//! # Config file location
//!
//! Priority order:
//! 1. explicit path (the CLI's `--config`)
//! 2. `$BACKDROP_CONFIG`
//! 3. `./backdrop.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{BdError, BdErrorKind, Result};
use crate::imaging::DownscaleOptions;
use crate::logging_facility::Profile;

pub const CONFIG_ENV_VAR: &str = "BACKDROP_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "backdrop.toml";

/// Which asset storage backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// File-backed store, falling back to the embedded database
    #[default]
    Auto,
    /// File-backed store only
    File,
    /// Embedded database only
    Embedded,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BackdropConfig {
    pub storage: StorageConfig,
    pub imaging: DownscaleOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StorageConfig {
    /// Root of the file-backed store; blobs live in `<root>/wallpapers`
    pub root: PathBuf,
    /// Embedded database file for the fallback backend
    pub database: PathBuf,
    /// Settings blob (catalog + current selection)
    pub settings: PathBuf,
    pub backend: BackendPreference,
    /// Bundled image served for the built-in default record
    pub default_asset: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".backdrop"),
            database: PathBuf::from(".backdrop/assets.db"),
            settings: PathBuf::from(".backdrop/settings.json"),
            backend: BackendPreference::Auto,
            default_asset: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl BackdropConfig {
    /// Resolve the config path from an explicit override or the environment
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the resolved location; defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read, `Config` if it
    /// does not parse or fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(&Self::config_path(explicit))
    }

    /// Load from a specific path; defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// See [`BackdropConfig::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BdError::new(BdErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    ///
    /// Returns `Config` for syntax errors, unknown keys or invalid values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: BackdropConfig = toml::from_str(contents).map_err(|e| {
            BdError::new(BdErrorKind::Config)
                .with_op("parse_config")
                .with_message(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `Config` if imaging limits are invalid or a storage path is empty.
    pub fn validate(&self) -> Result<()> {
        self.imaging.validate().map_err(|e| {
            BdError::new(BdErrorKind::Config)
                .with_op("validate_config")
                .with_message(format!("imaging: {}", e.message()))
        })?;

        for (name, path) in [
            ("storage.root", &self.storage.root),
            ("storage.database", &self.storage.database),
            ("storage.settings", &self.storage.settings),
        ] {
            if path.as_os_str().is_empty() {
                return Err(BdError::new(BdErrorKind::Config)
                    .with_op("validate_config")
                    .with_message(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = BackdropConfig::from_toml("").unwrap();
        assert_eq!(config, BackdropConfig::default());
        assert_eq!(config.imaging.max_width, 1920);
        assert_eq!(config.storage.backend, BackendPreference::Auto);
    }

    #[test]
    fn test_partial_override() {
        let config = BackdropConfig::from_toml(
            r#"
            [storage]
            backend = "embedded"
            default_asset = "assets/default.jpg"

            [imaging]
            quality = 0.5

            [logging]
            profile = "production"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, BackendPreference::Embedded);
        assert_eq!(
            config.storage.default_asset,
            Some(PathBuf::from("assets/default.jpg"))
        );
        assert_eq!(config.imaging.quality, 0.5);
        assert_eq!(config.imaging.max_height, 1080);
        assert_eq!(config.logging.profile, Profile::Production);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = BackdropConfig::from_toml("[storage]\nbogus = 1\n").unwrap_err();
        assert_eq!(err.kind(), BdErrorKind::Config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = BackdropConfig::from_toml("[imaging]\nquality = 0.0\n").unwrap_err();
        assert_eq!(err.kind(), BdErrorKind::Config);
        assert!(err.message().contains("quality"));

        let err = BackdropConfig::from_toml("[storage]\nsettings = \"\"\n").unwrap_err();
        assert!(err.message().contains("storage.settings"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = BackdropConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BackdropConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("backdrop.toml");
        std::fs::write(&path, "[imaging]\nmax_width = 1280\n").unwrap();

        let config = BackdropConfig::load(Some(&path)).unwrap();
        assert_eq!(config.imaging.max_width, 1280);
    }
}
