//! Reader progress tracking.
//!
//! Two independent namespaces share one persisted store:
//!
//! - module-scoped records: completed/review flags keyed by topic href
//! - page-scoped visit entries: keyed by full page path plus query string
//!
//! They coexist by design and are never merged. The store is advisory, not
//! authoritative: corrupt or missing data degrades to an empty record.

pub mod stats;
pub mod store;
pub mod sync;
pub mod term;

pub use stats::{ModuleStats, module_stats};
pub use store::{FlagKind, PageVisit, ProgressRecord, ProgressStore};
pub use sync::{BadgeSync, BulkAction, ProgressView};
