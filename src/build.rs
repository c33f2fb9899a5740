//! Manifest building orchestration.
//!
//! A build is always a full walk plus a full rewrite: every module manifest
//! is regenerated wholesale and the site-wide manifest is reassembled from
//! the per-module results. Module failures are isolated; one broken module
//! never prevents the others from being written.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── module dirs under content root
//!     │       │
//!     │       └── build_module() per dir (parallel, isolated)
//!     │               scan → extract titles → <module>/manifest.json
//!     │
//!     └── site manifest from successful modules → assets/manifest.json
//! ```

use crate::{
    config::SiteConfig,
    log,
    manifest::{
        MODULE_MANIFEST_FILE, ModuleManifest, PageEntry, SiteManifest, Topic, href_of, write_json,
    },
    scan::scan_topics,
    title::extract_title,
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Outcome of one site build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Successfully built modules with their topic counts.
    pub built: Vec<(String, usize)>,
    /// Failed modules with their error messages.
    pub failed: Vec<(String, String)>,
}

impl BuildReport {
    /// Total topics across all successfully built modules.
    pub fn total_topics(&self) -> usize {
        self.built.iter().map(|(_, n)| n).sum()
    }
}

/// Rebuild every module manifest and the site-wide manifest.
///
/// A missing content root is fatal: there is no useful degraded mode
/// without a content tree, and no partial manifest is written.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let content = &config.build.content;
    if !content.is_dir() {
        bail!("Content root not found: {}", content.display());
    }

    let modules = collect_module_dirs(content)?;
    if modules.is_empty() {
        log!("warn"; "no modules found under {}", content.display());
        return Ok(BuildReport::default());
    }

    // Build modules in parallel; each failure stays confined to its module.
    let outcomes: Vec<(String, Result<ModuleManifest>)> = modules
        .par_iter()
        .map(|dir| (module_name(dir), build_module(dir)))
        .collect();

    let mut report = BuildReport::default();
    let mut manifests = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(manifest) => {
                log!("build"; "module {}: {} topics", name, manifest.topics.len());
                report.built.push((name, manifest.topics.len()));
                manifests.push(manifest);
            }
            Err(e) => {
                log!("error"; "module {} failed: {:#}", name, e);
                report.failed.push((name, format!("{e:#}")));
            }
        }
    }

    let site = site_manifest(config, &manifests);
    write_json(&config.build.assets.join("manifest.json"), &site)
        .context("Failed to write site manifest")?;

    log!("build"; "done. total topics: {}", report.total_topics());
    if !report.failed.is_empty() {
        log!("warn"; "{} module(s) failed", report.failed.len());
    }

    Ok(report)
}

/// Build one module: scan, extract titles, write `manifest.json`.
///
/// Topic order equals scan order. Title extraction never fails, so the only
/// error sources are the scan itself and the manifest write.
pub fn build_module(module_dir: &Path) -> Result<ModuleManifest> {
    let module = module_name(module_dir);
    let files = scan_topics(module_dir)?;

    let topics = files
        .iter()
        .map(|rel| Topic {
            title: extract_title(&module_dir.join(rel)),
            href: href_of(rel),
        })
        .collect();

    let manifest = ModuleManifest { module, topics };
    write_json(&module_dir.join(MODULE_MANIFEST_FILE), &manifest)?;
    Ok(manifest)
}

/// Assemble the site-wide manifest from per-module manifests.
///
/// Page urls are site-root-relative (`<content>/<module>/<href>`), which
/// makes them globally unique. Tags come from the path: the module name plus
/// any intermediate directory components of the href.
pub fn site_manifest(config: &SiteConfig, manifests: &[ModuleManifest]) -> SiteManifest {
    let content_name = config
        .build
        .content
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("content");

    let pages = manifests
        .iter()
        .flat_map(|m| {
            m.topics.iter().map(|t| PageEntry {
                url: format!("{content_name}/{}/{}", m.module, t.href),
                title: t.title.clone(),
                tags: page_tags(&m.module, &t.href),
            })
        })
        .collect();

    SiteManifest { pages }
}

/// Tags for one page: module name, then intermediate directories of the href.
fn page_tags(module: &str, href: &str) -> Vec<String> {
    let mut tags = vec![module.to_string()];
    let mut parts: Vec<&str> = href.split('/').collect();
    parts.pop(); // drop the file name
    tags.extend(parts.into_iter().map(str::to_string));
    tags
}

/// Module subdirectories of the content root, sorted by name.
///
/// Hidden directories are not modules.
fn collect_module_dirs(content: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(content)
        .with_context(|| format!("Failed to read content root {}", content.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| !module_name(p).starts_with('.'))
        .collect();

    dirs.sort();
    Ok(dirs)
}

fn module_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}
