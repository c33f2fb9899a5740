//! Completion statistics.
//!
//! A pure join of a module manifest with its progress record. The result is
//! re-derivable at any time from those two inputs alone; nothing here holds
//! persisted state.

use super::store::{FlagKind, ProgressRecord};
use crate::manifest::ModuleManifest;

/// Aggregate completion counters for one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleStats {
    pub total: usize,
    pub complete: usize,
    pub review: usize,
    pub pct: u32,
}

/// Join a manifest with a progress record.
///
/// Only hrefs present in the manifest count; stale record entries from a
/// previous manifest version are ignored. `pct` is 0 when the module has no
/// topics.
pub fn module_stats(manifest: &ModuleManifest, record: &ProgressRecord) -> ModuleStats {
    let total = manifest.topics.len();
    let complete = manifest
        .topics
        .iter()
        .filter(|t| record.flag(FlagKind::Completed, &t.href))
        .count();
    let review = manifest
        .topics
        .iter()
        .filter(|t| record.flag(FlagKind::Review, &t.href))
        .count();

    let pct = if total == 0 {
        0
    } else {
        ((complete as f64 / total as f64) * 100.0).round() as u32
    };

    ModuleStats {
        total,
        complete,
        review,
        pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Topic;

    fn manifest(hrefs: &[&str]) -> ModuleManifest {
        ModuleManifest {
            module: "m".into(),
            topics: hrefs
                .iter()
                .map(|h| Topic {
                    title: h.to_string(),
                    href: h.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_manifest_has_zero_pct() {
        let stats = module_stats(&manifest(&[]), &ProgressRecord::default());
        assert_eq!(
            stats,
            ModuleStats {
                total: 0,
                complete: 0,
                review: 0,
                pct: 0
            }
        );
    }

    #[test]
    fn test_counts_and_rounding() {
        let m = manifest(&["a", "b", "c"]);
        let mut record = ProgressRecord::default();
        record.completed.insert("a".into(), true);
        record.review.insert("c".into(), true);

        let stats = module_stats(&m, &record);
        assert_eq!(
            stats,
            ModuleStats {
                total: 3,
                complete: 1,
                review: 1,
                pct: 33
            }
        );
    }

    #[test]
    fn test_stale_hrefs_are_ignored() {
        let m = manifest(&["a", "b"]);
        let mut record = ProgressRecord::default();
        record.completed.insert("a".into(), true);
        // Leftover from a previous manifest version
        record.completed.insert("gone.html".into(), true);
        record.review.insert("also-gone.html".into(), true);

        let stats = module_stats(&m, &record);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.complete, 1);
        assert_eq!(stats.review, 0);
        assert_eq!(stats.pct, 50);
    }

    #[test]
    fn test_false_flags_do_not_count() {
        let m = manifest(&["a"]);
        let mut record = ProgressRecord::default();
        record.completed.insert("a".into(), false);

        let stats = module_stats(&m, &record);
        assert_eq!(stats.complete, 0);
        assert_eq!(stats.pct, 0);
    }

    #[test]
    fn test_all_complete_is_100() {
        let m = manifest(&["a", "b", "c", "d"]);
        let mut record = ProgressRecord::default();
        for t in &m.topics {
            record.completed.insert(t.href.clone(), true);
        }

        let stats = module_stats(&m, &record);
        assert_eq!(stats.complete, 4);
        assert_eq!(stats.pct, 100);
    }
}
