//! `[build]` section configuration.
//!
//! Paths of the course tree the manifest builder operates on.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in studymap.toml - course tree layout.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"
/// assets = "assets"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Course root directory. Set from the CLI, not the config file.
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content directory holding one subdirectory per module.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Assets directory; the site-wide manifest is written here.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,
}

/// `[watch]` section in studymap.toml - rebuild scheduler tuning.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet window in milliseconds. A burst of filesystem events within
    /// this window coalesces into one rebuild.
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,
}
