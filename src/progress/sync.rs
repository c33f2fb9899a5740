//! Badge synchronization.
//!
//! Keeps a rendered list of topic controls consistent with the progress
//! store after every mutation. Mutations flow through an explicit state
//! machine instead of ad-hoc UI callbacks:
//!
//! ```text
//! toggle(kind, href) → store.toggle + persist
//!                    → view.patch_badge(one control)
//!                    → view.patch_stats(aggregate)
//! ```
//!
//! A single toggle patches exactly one badge plus the stats bar, never the
//! whole list. Bulk actions are one persisted write followed by one full
//! re-render.

use super::{
    stats::{ModuleStats, module_stats},
    store::{FlagKind, ProgressRecord, ProgressStore},
};
use crate::{manifest::ModuleManifest, registry::ManifestRegistry};
use anyhow::Result;

/// Whole-record operations on one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkAllComplete,
    ClearCompleted,
    ClearReview,
    ResetAll,
}

/// Rendering surface the sync layer patches.
///
/// The terminal view implements this; the original browser toolbar is an
/// external collaborator implementing the same contract.
pub trait ProgressView {
    /// Update the displayed state of a single toggle control.
    fn patch_badge(&mut self, kind: FlagKind, href: &str, on: bool);

    /// Update the aggregate stats display.
    fn patch_stats(&mut self, stats: &ModuleStats);

    /// Re-render every topic badge plus the stats display.
    fn render_all(&mut self, manifest: &ModuleManifest, record: &ProgressRecord, stats: &ModuleStats);
}

/// Reconciles toggle state with the progress store.
pub struct BadgeSync<'a> {
    registry: &'a ManifestRegistry,
    store: &'a ProgressStore,
}

impl<'a> BadgeSync<'a> {
    pub fn new(registry: &'a ManifestRegistry, store: &'a ProgressStore) -> Self {
        Self { registry, store }
    }

    /// Flip one flag: persist, patch the affected control, refresh stats.
    /// Returns the new value of the flag.
    pub fn toggle(
        &self,
        module: &str,
        kind: FlagKind,
        href: &str,
        view: &mut dyn ProgressView,
    ) -> Result<bool> {
        let on = self.store.toggle(module, kind, href)?;
        view.patch_badge(kind, href, on);
        view.patch_stats(&self.stats(module));
        Ok(on)
    }

    /// Apply a whole-record action in one persisted write, then re-render
    /// everything.
    pub fn apply_bulk(
        &self,
        module: &str,
        action: BulkAction,
        view: &mut dyn ProgressView,
    ) -> Result<()> {
        let manifest = self.manifest(module);

        match action {
            BulkAction::MarkAllComplete => {
                let hrefs: Vec<String> =
                    manifest.topics.iter().map(|t| t.href.clone()).collect();
                self.store.mark_all(module, &hrefs)?;
            }
            BulkAction::ClearCompleted => self.store.clear(module, FlagKind::Completed)?,
            BulkAction::ClearReview => self.store.clear(module, FlagKind::Review)?,
            BulkAction::ResetAll => self.store.reset(module)?,
        }

        let record = self.store.load(module);
        let stats = module_stats(&manifest, &record);
        view.render_all(&manifest, &record, &stats);
        Ok(())
    }

    /// Current stats for a module, joined from registry and store.
    pub fn stats(&self, module: &str) -> ModuleStats {
        module_stats(&self.manifest(module), &self.store.load(module))
    }

    /// The module's manifest, or an empty one when it is not registered.
    /// Toggling against an unknown module still persists; its stats simply
    /// stay at zero until a manifest exists.
    fn manifest(&self, module: &str) -> ModuleManifest {
        self.registry.module(module).cloned().unwrap_or(ModuleManifest {
            module: module.to_string(),
            topics: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Topic;

    /// Recording view: counts patches instead of drawing them.
    #[derive(Default)]
    struct RecordingView {
        badge_patches: Vec<(FlagKind, String, bool)>,
        stats_patches: Vec<ModuleStats>,
        full_renders: usize,
    }

    impl ProgressView for RecordingView {
        fn patch_badge(&mut self, kind: FlagKind, href: &str, on: bool) {
            self.badge_patches.push((kind, href.to_string(), on));
        }
        fn patch_stats(&mut self, stats: &ModuleStats) {
            self.stats_patches.push(*stats);
        }
        fn render_all(
            &mut self,
            _manifest: &ModuleManifest,
            _record: &ProgressRecord,
            _stats: &ModuleStats,
        ) {
            self.full_renders += 1;
        }
    }

    fn registry_with(hrefs: &[&str]) -> ManifestRegistry {
        let mut registry = ManifestRegistry::empty();
        registry.insert(ModuleManifest {
            module: "math".into(),
            topics: hrefs
                .iter()
                .map(|h| Topic {
                    title: h.to_string(),
                    href: h.to_string(),
                })
                .collect(),
        });
        registry
    }

    fn store_in(dir: &tempfile::TempDir) -> ProgressStore {
        ProgressStore::open(dir.path().join("progress.json"))
    }

    #[test]
    fn test_toggle_patches_one_badge_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&["a.html", "b.html", "c.html"]);
        let store = store_in(&dir);
        let sync = BadgeSync::new(&registry, &store);
        let mut view = RecordingView::default();

        let on = sync
            .toggle("math", FlagKind::Completed, "a.html", &mut view)
            .unwrap();

        assert!(on);
        assert_eq!(
            view.badge_patches,
            vec![(FlagKind::Completed, "a.html".to_string(), true)]
        );
        assert_eq!(view.stats_patches.len(), 1);
        assert_eq!(view.stats_patches[0].complete, 1);
        assert_eq!(view.stats_patches[0].pct, 33);
        assert_eq!(view.full_renders, 0, "single toggle must not re-render the list");
    }

    #[test]
    fn test_mark_all_complete_renders_once() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&["a", "b", "c", "d"]);
        let store = store_in(&dir);
        let sync = BadgeSync::new(&registry, &store);
        let mut view = RecordingView::default();

        sync.apply_bulk("math", BulkAction::MarkAllComplete, &mut view)
            .unwrap();

        let stats = sync.stats("math");
        assert_eq!(stats.complete, 4);
        assert_eq!(stats.pct, 100);
        assert_eq!(view.full_renders, 1);
        assert!(view.badge_patches.is_empty());
    }

    #[test]
    fn test_clear_review_keeps_completed() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&["a", "b"]);
        let store = store_in(&dir);
        let sync = BadgeSync::new(&registry, &store);
        let mut view = RecordingView::default();

        sync.toggle("math", FlagKind::Completed, "a", &mut view)
            .unwrap();
        sync.toggle("math", FlagKind::Review, "b", &mut view)
            .unwrap();
        sync.apply_bulk("math", BulkAction::ClearReview, &mut view)
            .unwrap();

        let stats = sync.stats("math");
        assert_eq!(stats.complete, 1);
        assert_eq!(stats.review, 0);
    }

    #[test]
    fn test_reset_all_zeroes_stats() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&["a", "b"]);
        let store = store_in(&dir);
        let sync = BadgeSync::new(&registry, &store);
        let mut view = RecordingView::default();

        sync.apply_bulk("math", BulkAction::MarkAllComplete, &mut view)
            .unwrap();
        sync.apply_bulk("math", BulkAction::ResetAll, &mut view)
            .unwrap();

        assert_eq!(sync.stats("math"), ModuleStats {
            total: 2,
            complete: 0,
            review: 0,
            pct: 0
        });
    }

    #[test]
    fn test_unknown_module_toggles_without_stats() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ManifestRegistry::empty();
        let store = store_in(&dir);
        let sync = BadgeSync::new(&registry, &store);
        let mut view = RecordingView::default();

        sync.toggle("ghost", FlagKind::Completed, "x.html", &mut view)
            .unwrap();

        // Flag persisted, but stats stay at zero without a manifest
        assert!(store.load("ghost").flag(FlagKind::Completed, "x.html"));
        assert_eq!(sync.stats("ghost"), ModuleStats::default());
    }
}
