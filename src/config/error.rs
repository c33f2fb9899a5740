//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating `studymap.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("[watch.debounce_ms] must be greater than zero")]
    DebounceWindowZero,

    #[error("[serve.interface] `{0}` is not a valid IP address")]
    InvalidInterface(String),

    #[error("[progress.manifest_url] `{0}` must start with http:// or https://")]
    InvalidManifestUrl(String),
}
