//! Terminal rendering of topic lists and progress stats.
//!
//! The reference [`ProgressView`] implementation. Renders the "topics" mount
//! (an ordered list of href/title links) and the "progress" mount (a bar
//! plus numeric summary) on stdout.

use super::{
    stats::ModuleStats,
    store::{FlagKind, ProgressRecord},
    sync::ProgressView,
};
use crate::manifest::ModuleManifest;
use colored::Colorize;

const BAR_WIDTH: usize = 30;

/// Stdout implementation of [`ProgressView`].
#[derive(Debug, Default)]
pub struct TermView;

impl TermView {
    fn badge(record: &ProgressRecord, href: &str) -> String {
        let done = if record.flag(FlagKind::Completed, href) {
            "✓".bright_green().bold().to_string()
        } else {
            " ".to_string()
        };
        let review = if record.flag(FlagKind::Review, href) {
            "⚑".bright_yellow().bold().to_string()
        } else {
            " ".to_string()
        };
        format!("[{done}{review}]")
    }
}

impl ProgressView for TermView {
    fn patch_badge(&mut self, kind: FlagKind, href: &str, on: bool) {
        let state = if on { "on" } else { "off" };
        println!("{} {} → {}", kind.name(), href, state.bold());
    }

    fn patch_stats(&mut self, stats: &ModuleStats) {
        println!("{}", format_stats(stats));
    }

    fn render_all(
        &mut self,
        manifest: &ModuleManifest,
        record: &ProgressRecord,
        stats: &ModuleStats,
    ) {
        println!("{}", manifest.module.bold());
        for topic in &manifest.topics {
            println!(
                "  {} {}  {}",
                Self::badge(record, &topic.href),
                topic.href,
                topic.title.dimmed()
            );
        }
        println!("{}", format_stats(stats));
    }
}

/// Render the stats bar: `[██████░░░░] 2/5 complete, 1 review (40%)`.
fn format_stats(stats: &ModuleStats) -> String {
    let filled = if stats.total > 0 {
        stats.complete * BAR_WIDTH / stats.total
    } else {
        0
    };
    let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);

    format!(
        "[{bar}] {}/{} complete, {} review ({}%)",
        stats.complete, stats.total, stats.review, stats.pct
    )
}
