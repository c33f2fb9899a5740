//! Content scanner.
//!
//! Walks a module directory and returns every `.html` document below it,
//! excluding `index.html` landing pages. The result order is a public
//! contract: it determines topic display order, so paths are compared in
//! their `/`-normalized relative form regardless of platform.

use crate::manifest::href_of;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check whether a file name marks a topic document.
///
/// `index.html` at any depth is a landing page, never a topic.
fn is_topic_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".html") && lower != "index.html"
}

/// Collect every topic document under `dir`, as paths relative to `dir`,
/// sorted by their `/`-normalized form.
///
/// Any unreadable directory aborts the whole scan; partial results are never
/// returned silently.
pub fn scan_topics(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry =
            entry.with_context(|| format!("Failed to scan content under {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_str().unwrap_or_default();
        if !is_topic_file(name) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(rel);
    }

    files.sort_by_key(|rel| href_of(rel));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    #[test]
    fn test_scan_sorted_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.html"));
        touch(&dir.path().join("a.html"));
        touch(&dir.path().join("unit2/late.html"));
        touch(&dir.path().join("unit1/early.html"));

        let topics = scan_topics(dir.path()).unwrap();
        let hrefs: Vec<_> = topics.iter().map(|p| href_of(p)).collect();
        assert_eq!(
            hrefs,
            vec!["a.html", "b.html", "unit1/early.html", "unit2/late.html"]
        );
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("z.html"));
        touch(&dir.path().join("m/k.html"));
        touch(&dir.path().join("a.html"));

        let first = scan_topics(dir.path()).unwrap();
        let second = scan_topics(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_html_excluded_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("index.html"));
        touch(&dir.path().join("unit1/index.html"));
        touch(&dir.path().join("unit1/deep/Index.HTML"));
        touch(&dir.path().join("unit1/topic.html"));

        let topics = scan_topics(dir.path()).unwrap();
        let hrefs: Vec<_> = topics.iter().map(|p| href_of(p)).collect();
        assert_eq!(hrefs, vec!["unit1/topic.html"]);
    }

    #[test]
    fn test_non_html_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("image.png"));
        touch(&dir.path().join("page.html"));

        let topics = scan_topics(dir.path()).unwrap();
        assert_eq!(topics.len(), 1);
    }

    #[test]
    fn test_html_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("UPPER.HTML"));

        let topics = scan_topics(dir.path()).unwrap();
        assert_eq!(topics.len(), 1);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_topics(&missing).is_err());
    }
}
