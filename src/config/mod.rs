//! Configuration management for `studymap.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                       |
//! |--------------|-----------------------------------------------|
//! | `[build]`    | Course tree layout (content, assets)          |
//! | `[watch]`    | Rebuild scheduler tuning (debounce window)    |
//! | `[progress]` | Progress store path, manifest source URL      |
//! | `[serve]`    | Development server (port, interface, watch)   |
//!
//! The config file is optional: a bare content tree with no
//! `studymap.toml` runs entirely on defaults.
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"
//!
//! [watch]
//! debounce_ms = 300
//!
//! [serve]
//! port = 5277
//! ```

mod build;
pub mod defaults;
mod error;
mod progress;
mod serve;

use build::{BuildConfig, WatchConfig};
use error::ConfigError;
use progress::ProgressConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing studymap.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Course tree layout
    #[serde(default)]
    pub build: BuildConfig,

    /// Rebuild scheduler settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Progress tracking settings
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.set_root(&root);
        self.update_path_with_root(&root);

        if let Commands::Serve {
            interface,
            port,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.content, cli.content.as_ref());

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize all directory paths
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.progress.store = Self::normalize_path(&root.join(&self.progress.store));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if self.watch.debounce_ms == 0 {
            bail!(ConfigError::DebounceWindowZero);
        }

        if self.serve.interface.parse::<std::net::IpAddr>().is_err() {
            bail!(ConfigError::InvalidInterface(self.serve.interface.clone()));
        }

        if let Some(url) = &self.progress.manifest_url
            && !url.starts_with("http")
        {
            bail!(ConfigError::InvalidManifestUrl(url.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_empty_uses_defaults() {
        let config = SiteConfig::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.watch.debounce_ms, 300);
        assert_eq!(config.serve.port, 5277);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [build
            content = "courses"
        "#;
        assert!(SiteConfig::from_str(invalid_config).is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_validate_rejects_zero_debounce() {
        let mut config = SiteConfig::default();
        config.watch.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_interface() {
        let mut config = SiteConfig::default();
        config.serve.interface = "localhost".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_error_names_offending_value() {
        let mut config = SiteConfig::default();
        config.serve.interface = "localhost".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn test_validate_rejects_non_http_manifest_url() {
        let mut config = SiteConfig::default();
        config.progress.manifest_url = Some("ftp://example.com".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [unknown_section]
            field = "value"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
