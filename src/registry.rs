//! Manifest registry.
//!
//! An explicit, dependency-injected collection of manifests: consumers
//! (stats, badge sync, the topics view) receive a registry instead of
//! reaching into global state or the filesystem themselves.
//!
//! Loading never fails past this boundary. A missing or corrupt artifact is
//! logged and skipped; a failed HTTP fetch falls back to the empty embedded
//! manifest set. The reading side of the tool must always come up, even with
//! nothing built yet.

use crate::{
    config::SiteConfig,
    log,
    manifest::{MODULE_MANIFEST_FILE, ModuleManifest, SITE_MANIFEST_FILE, SiteManifest},
};
use serde::de::DeserializeOwned;
use std::{collections::BTreeMap, fs, path::Path, time::Duration};

const FETCH_TIMEOUT_SECS: u64 = 5;

/// Registry of module manifests plus the site-wide manifest.
#[derive(Debug, Default)]
pub struct ManifestRegistry {
    modules: BTreeMap<String, ModuleManifest>,
    site: SiteManifest,
}

impl ManifestRegistry {
    /// The embedded fallback: no modules, no pages.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load manifests as configured: over HTTP when `[progress.manifest_url]`
    /// is set, otherwise from the course tree.
    pub fn load(config: &SiteConfig) -> Self {
        match &config.progress.manifest_url {
            Some(url) => Self::from_url(url),
            None => Self::from_dir(config),
        }
    }

    /// Read manifest artifacts from the course tree.
    ///
    /// The site manifest is read from the configured assets directory, the
    /// same location the builder writes it to.
    pub fn from_dir(config: &SiteConfig) -> Self {
        let mut registry = Self::empty();

        let site_path = config.build.assets.join("manifest.json");
        if let Some(site) = read_json::<SiteManifest>(&site_path) {
            registry.site = site;
        }

        let content = &config.build.content;
        let Ok(entries) = fs::read_dir(content) else {
            log!("warn"; "no manifests under {}", content.display());
            return registry;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let manifest_path = entry.path().join(MODULE_MANIFEST_FILE);
            if !manifest_path.is_file() {
                continue;
            }
            if let Some(manifest) = read_json::<ModuleManifest>(&manifest_path) {
                registry.insert(manifest);
            }
        }

        registry
    }

    /// Fetch manifests from an HTTP base URL.
    ///
    /// Any failure degrades to what was fetched so far, ultimately to the
    /// empty embedded set. The caller never waits on a dead server beyond
    /// the fetch timeout.
    pub fn from_url(base: &str) -> Self {
        let mut registry = Self::empty();
        let base = base.trim_end_matches('/');

        let Ok(client) = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
        else {
            log!("warn"; "http client unavailable, using embedded manifest");
            return registry;
        };

        let site_url = format!("{base}/{SITE_MANIFEST_FILE}");
        match fetch_json::<SiteManifest>(&client, &site_url) {
            Some(site) => registry.site = site,
            None => {
                log!("warn"; "failed to fetch {site_url}, falling back to embedded manifest");
                return registry;
            }
        }

        // Module manifests live next to their content; derive the set of
        // module locations from the site manifest's page urls.
        for prefix in module_prefixes(&registry.site) {
            let url = format!("{base}/{prefix}/{MODULE_MANIFEST_FILE}");
            match fetch_json::<ModuleManifest>(&client, &url) {
                Some(manifest) => registry.insert(manifest),
                None => log!("warn"; "failed to fetch {url}, module skipped"),
            }
        }

        registry
    }

    /// Register one module manifest, replacing any previous version.
    pub fn insert(&mut self, manifest: ModuleManifest) {
        self.modules.insert(manifest.module.clone(), manifest);
    }

    pub fn module(&self, name: &str) -> Option<&ModuleManifest> {
        self.modules.get(name)
    }

    pub fn site(&self) -> &SiteManifest {
        &self.site
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

/// `<content>/<module>` prefixes of all pages, deduplicated in order.
fn module_prefixes(site: &SiteManifest) -> Vec<String> {
    let mut seen = Vec::new();
    for page in &site.pages {
        let mut parts = page.url.splitn(3, '/');
        if let (Some(content), Some(module), Some(_)) = (parts.next(), parts.next(), parts.next()) {
            let prefix = format!("{content}/{module}");
            if !seen.contains(&prefix) {
                seen.push(prefix);
            }
        }
    }
    seen
}

/// Read and parse a JSON artifact, logging and absorbing failures.
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log!("warn"; "ignoring corrupt manifest {}: {e}", path.display());
            None
        }
    }
}

fn fetch_json<T: DeserializeOwned>(client: &reqwest::blocking::Client, url: &str) -> Option<T> {
    let response = client.get(url).send().ok()?.error_for_status().ok()?;
    response.json().ok()
}
