//! Manifest data model.
//!
//! Two granularities coexist by design:
//!
//! - [`ModuleManifest`]: the ordered topic index of one module directory,
//!   persisted as `manifest.json` inside that directory.
//! - [`SiteManifest`]: the flat page index across all modules, persisted as
//!   `assets/manifest.json` next to the content root.
//!
//! Manifests are produced wholly by the builder and are read-only for every
//! consumer. Topic identity within a module is its `href`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path},
};

/// File name of the per-module manifest artifact.
pub const MODULE_MANIFEST_FILE: &str = "manifest.json";

/// Site-wide manifest artifact, relative to the course root.
pub const SITE_MANIFEST_FILE: &str = "assets/manifest.json";

/// One content document within a module.
///
/// `href` is the document path relative to the module root, `/`-separated on
/// every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub href: String,
}

/// The ordered topic index of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub module: String,
    pub topics: Vec<Topic>,
}

impl ModuleManifest {
    /// Whether `href` names a topic of this module.
    pub fn contains(&self, href: &str) -> bool {
        self.topics.iter().any(|t| t.href == href)
    }
}

/// One page in the site-wide manifest. `url` is unique across the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The flat page index across all modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteManifest {
    pub pages: Vec<PageEntry>,
}

/// Normalize a relative path to a `/`-separated href string.
///
/// Topic ordering is defined over this form, so it must be identical across
/// operating systems.
pub fn href_of(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Write a manifest as pretty JSON via a temp file + rename.
///
/// A rebuild may be superseded but never aborted mid-write; the rename keeps
/// the previous artifact intact until the new one is complete.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
