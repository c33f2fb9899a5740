//! Persisted progress store.
//!
//! One JSON file holds every module record and every page-visit entry.
//! Reads never fail: missing or corrupt data yields an empty-but-valid
//! record, because the store is advisory. Writes are full overwrites via the
//! same temp-file + rename path the manifests use; callers read-modify-write.
//!
//! The file carries no lock. Two processes writing concurrently race with
//! last-write-wins; that limitation is accepted, not worked around.

use crate::manifest::write_json;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Which per-topic flag an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Completed,
    Review,
}

impl FlagKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Review => "review",
        }
    }
}

/// Per-module progress flags, keyed by topic href.
///
/// Hrefs that no longer exist in the module's current manifest may linger
/// here; aggregation ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed: BTreeMap<String, bool>,
    #[serde(default)]
    pub review: BTreeMap<String, bool>,
}

impl ProgressRecord {
    pub fn flag(&self, kind: FlagKind, href: &str) -> bool {
        self.map(kind).get(href).copied().unwrap_or(false)
    }

    pub fn map(&self, kind: FlagKind) -> &BTreeMap<String, bool> {
        match kind {
            FlagKind::Completed => &self.completed,
            FlagKind::Review => &self.review,
        }
    }

    fn map_mut(&mut self, kind: FlagKind) -> &mut BTreeMap<String, bool> {
        match kind {
            FlagKind::Completed => &mut self.completed,
            FlagKind::Review => &mut self.review,
        }
    }
}

/// Per-page visit entry, independent of the module-scoped records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageVisit {
    #[serde(default)]
    pub last_opened: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub review: bool,
}

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    modules: BTreeMap<String, ProgressRecord>,
    #[serde(default)]
    pages: BTreeMap<String, PageVisit>,
}

/// The persisted progress store.
pub struct ProgressStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl ProgressStore {
    /// Open the store at `path`. Missing or corrupt data is swallowed and
    /// treated as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = read_store(&path);
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    // ------------------------------------------------------------------
    // Module-scoped records
    // ------------------------------------------------------------------

    /// Load a module's record. Always returns a valid record, never fails.
    pub fn load(&self, module: &str) -> ProgressRecord {
        self.data
            .read()
            .modules
            .get(module)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a module's record wholesale and persist.
    pub fn save(&self, module: &str, record: ProgressRecord) -> Result<()> {
        let mut data = self.data.write();
        data.modules.insert(module.to_string(), record);
        self.persist(&data)
    }

    /// Flip one flag, creating the module record if absent.
    /// Returns the new value of the flag.
    pub fn toggle(&self, module: &str, kind: FlagKind, href: &str) -> Result<bool> {
        let mut data = self.data.write();
        let record = data.modules.entry(module.to_string()).or_default();
        let flag = record.map_mut(kind).entry(href.to_string()).or_insert(false);
        *flag = !*flag;
        let value = *flag;
        self.persist(&data)?;
        Ok(value)
    }

    /// Set the completed flag for every given href in one persisted write.
    pub fn mark_all(&self, module: &str, hrefs: &[String]) -> Result<()> {
        let mut data = self.data.write();
        let record = data.modules.entry(module.to_string()).or_default();
        for href in hrefs {
            record.completed.insert(href.clone(), true);
        }
        self.persist(&data)
    }

    /// Drop every flag of one kind for a module, in one persisted write.
    pub fn clear(&self, module: &str, kind: FlagKind) -> Result<()> {
        let mut data = self.data.write();
        if let Some(record) = data.modules.get_mut(module) {
            record.map_mut(kind).clear();
        }
        self.persist(&data)
    }

    /// Drop all flags for a module.
    pub fn reset(&self, module: &str) -> Result<()> {
        let mut data = self.data.write();
        data.modules.remove(module);
        self.persist(&data)
    }

    // ------------------------------------------------------------------
    // Page-scoped visit entries
    // ------------------------------------------------------------------

    /// Load a page's visit entry. Always returns a valid entry.
    pub fn page(&self, key: &str) -> PageVisit {
        self.data.read().pages.get(key).cloned().unwrap_or_default()
    }

    /// Stamp `last_opened` with the current time, creating the entry if
    /// absent.
    pub fn mark_visited(&self, key: &str) -> Result<()> {
        let mut data = self.data.write();
        let entry = data.pages.entry(key.to_string()).or_default();
        entry.last_opened = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        self.persist(&data)
    }

    /// Set one flag of a page's visit entry.
    pub fn set_flag(&self, key: &str, kind: FlagKind, value: bool) -> Result<()> {
        let mut data = self.data.write();
        let entry = data.pages.entry(key.to_string()).or_default();
        match kind {
            FlagKind::Completed => entry.completed = value,
            FlagKind::Review => entry.review = value,
        }
        self.persist(&data)
    }

    /// Read one flag of a page's visit entry.
    pub fn get_flag(&self, key: &str, kind: FlagKind) -> bool {
        let entry = self.page(key);
        match kind {
            FlagKind::Completed => entry.completed,
            FlagKind::Review => entry.review,
        }
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        write_json(&self.path, data)
    }
}

/// Read the store file, degrading to empty on any failure.
fn read_store(path: &Path) -> StoreData {
    let Ok(text) = fs::read_to_string(path) else {
        return StoreData::default();
    };
    serde_json::from_str(&text).unwrap_or_default()
}
