//! Title extraction for topic documents.
//!
//! Reads the first `<title>` element of an HTML file. This function never
//! fails past its own boundary: an unreadable file or a missing title
//! degrades to a name derived from the file itself, so one broken document
//! cannot abort a build.

use regex::Regex;
use std::{path::Path, sync::LazyLock};

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>(.*?)</title>").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Derive a human-readable title for one document file.
pub fn extract_title(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(text) => match TITLE_RE.captures(&text) {
            Some(caps) => collapse_whitespace(&caps[1]),
            None => fallback_title(file),
        },
        Err(_) => fallback_title(file),
    }
}

/// Collapse internal whitespace runs to single spaces and trim.
fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, " ").trim().to_string()
}

/// File stem with `-`/`_` separators replaced by spaces.
fn fallback_title(file: &Path) -> String {
    file.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace(['-', '_'], " ")
}
