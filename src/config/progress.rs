//! `[progress]` section configuration.
//!
//! Where the reader's progress record lives and where manifests are loaded
//! from at read time.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[progress]` section in studymap.toml.
///
/// # Example
/// ```toml
/// [progress]
/// store = ".studymap/progress.json"
/// manifest_url = "http://127.0.0.1:5277"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    /// Progress store file, relative to the course root.
    ///
    /// Single-reader, single-device; concurrent writers race with
    /// last-write-wins, which is an accepted limitation.
    #[serde(default = "defaults::progress::store")]
    #[educe(Default = defaults::progress::store())]
    pub store: PathBuf,

    /// Optional base URL to fetch manifests from instead of reading the
    /// course tree. A failed fetch falls back to an empty manifest set.
    #[serde(default = "defaults::progress::manifest_url")]
    #[educe(Default = defaults::progress::manifest_url())]
    pub manifest_url: Option<String>,
}
