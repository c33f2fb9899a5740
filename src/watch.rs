//! File system watcher driving manifest rebuilds.
//!
//! Every qualifying change under the content root schedules a full rebuild
//! of every module. Manifests are small, so the simplicity of a full rebuild
//! wins over incremental bookkeeping.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Event Loop                            │
//! │                                                            │
//! │  ┌──────────┐    ┌────────────────┐    ┌───────────────┐   │
//! │  │ notify   │───▶│ Scheduler      │───▶│ build_site()  │   │
//! │  │ events   │    │ (300ms quiet   │    │ (full rebuild)│   │
//! │  └──────────┘    │  window,       │    └───────────────┘   │
//! │                  │  one in flight)│                        │
//! │                  └────────────────┘                        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is a debouncer, not a throttle: the timer resets on every
//! new event and the rebuild fires only once the window elapses quietly.

use crate::{build::build_site, config::SiteConfig, log};
use anyhow::{Context, Result};
use notify::{
    Event, EventKind, RecursiveMode, Watcher,
    event::{CreateKind, RemoveKind},
};
use std::{
    path::Path,
    time::{Duration, Instant},
};

/// Poll interval while no rebuild is pending.
const IDLE_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Check whether a changed path should trigger a rebuild.
///
/// Directories always qualify regardless of name; files qualify only when
/// they end in `.html`. Editor temp files and dotfiles never qualify.
fn qualifies(path: &Path, is_dir: bool) -> bool {
    if is_temp_file(path) {
        return false;
    }
    if is_dir {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html"))
}

/// Format path as relative for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Rebuild Scheduler
// =============================================================================

/// Debounced rebuild scheduler.
///
/// State machine:
/// - event arrives        → `pending = true`, timer resets
/// - quiet window elapses → if nothing running: `running = true`,
///   `pending = false`, execute
/// - rebuild completes    → `running = false`; if `pending` was set again
///   meanwhile, execute once more
///
/// This guarantees a burst coalesces into exactly one rebuild, no event is
/// lost, and at most one rebuild is ever in flight.
pub struct Scheduler {
    window: Duration,
    pending: bool,
    running: bool,
    last_event: Option<Instant>,
}

impl Scheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: false,
            running: false,
            last_event: None,
        }
    }

    /// Record a qualifying event. Resets the quiet window.
    pub fn on_event(&mut self) {
        self.pending = true;
        self.last_event = Some(Instant::now());
    }

    /// Whether a rebuild should start now: work is pending, nothing is in
    /// flight, and the quiet window has elapsed.
    pub fn ready(&self) -> bool {
        self.pending
            && !self.running
            && self
                .last_event
                .is_none_or(|t| t.elapsed() >= self.window)
    }

    /// Transition into a running rebuild.
    pub fn begin(&mut self) {
        self.running = true;
        self.pending = false;
        self.last_event = None;
    }

    /// Finish the running rebuild. Returns true when events arrived during
    /// the run and one further rebuild must follow.
    pub fn complete(&mut self) -> bool {
        self.running = false;
        self.pending
    }

    /// How long the event loop may sleep before it must re-check readiness.
    ///
    /// While pending this is the remainder of the quiet window, not the full
    /// window: channel traffic that never qualifies (non-`.html` files,
    /// watcher errors) re-enters the loop and must not push the rebuild out.
    pub fn timeout(&self) -> Duration {
        if self.pending && !self.running {
            match self.last_event {
                Some(t) => self.window.saturating_sub(t.elapsed()),
                None => self.window,
            }
        } else {
            Duration::from_secs(IDLE_TIMEOUT_SECS)
        }
    }
}

// =============================================================================
// Event Classification
// =============================================================================

/// Human-readable action for a notify event, or None for irrelevant kinds.
fn event_action(event: &Event) -> Option<(&'static str, bool)> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Some(("folder added", true)),
        EventKind::Remove(RemoveKind::Folder) => Some(("folder removed", true)),
        EventKind::Create(_) => Some(("added", false)),
        EventKind::Modify(_) => Some(("changed", false)),
        EventKind::Remove(_) => Some(("removed", false)),
        _ => None,
    }
}

/// Log the event and report whether it should schedule a rebuild.
fn handle_event(event: &Event, root: &Path) -> bool {
    let Some((action, kind_is_dir)) = event_action(event) else {
        return false;
    };

    let mut triggered = false;
    for path in &event.paths {
        let is_dir = kind_is_dir || path.is_dir();
        if qualifies(path, is_dir) {
            log!("watch"; "{}: {}", action, rel_path(path, root));
            triggered = true;
        }
    }
    triggered
}

// =============================================================================
// Public API
// =============================================================================

/// Execute the scheduled rebuild, repeating once when events arrived
/// mid-run. A started rebuild always writes its full manifest set; it is
/// superseded by a fresher rebuild, never aborted.
fn run_scheduled(scheduler: &mut Scheduler, config: &SiteConfig) {
    scheduler.begin();
    loop {
        match build_site(config) {
            Ok(report) => {
                log!("watch"; "rebuilt all manifests (total topics: {})", report.total_topics());
            }
            Err(e) => log!("error"; "rebuild failed: {:#}", e),
        }
        if !scheduler.complete() {
            break;
        }
        scheduler.begin();
    }
}

/// Start the blocking file watcher with debouncing and full rebuilds.
///
/// The caller is expected to have run one unconditional build already, so
/// the manifest set is fresh regardless of watcher readiness latency.
pub fn watch_for_changes_blocking(config: &SiteConfig) -> Result<()> {
    let content = &config.build.content;
    let root = config.get_root().to_path_buf();

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(content, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", content.display()))?;

    log!("watch"; "watching {}", rel_path(content, &root));

    let mut scheduler = Scheduler::new(Duration::from_millis(config.watch.debounce_ms));

    loop {
        match rx.recv_timeout(scheduler.timeout()) {
            Ok(Ok(event)) => {
                if handle_event(&event, &root) {
                    scheduler.on_event();
                }
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if scheduler.ready() => {
                run_scheduled(&mut scheduler, config);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            // Timeout without pending work
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread::sleep;

    const WINDOW: Duration = Duration::from_millis(20);

    /// Drive the scheduler the way the event loop does, counting rebuilds.
    fn drain(scheduler: &mut Scheduler) -> usize {
        let mut rebuilds = 0;
        while scheduler.ready() {
            scheduler.begin();
            rebuilds += 1;
            scheduler.complete();
        }
        rebuilds
    }

    #[test]
    fn test_burst_coalesces_into_one_rebuild() {
        let mut s = Scheduler::new(WINDOW);

        for _ in 0..5 {
            s.on_event();
        }
        // Window has not elapsed yet
        assert!(!s.ready());

        sleep(WINDOW * 2);
        assert_eq!(drain(&mut s), 1);
        assert!(!s.ready());
    }

    #[test]
    fn test_two_separated_bursts_rebuild_twice() {
        let mut s = Scheduler::new(WINDOW);

        s.on_event();
        s.on_event();
        sleep(WINDOW * 2);
        assert_eq!(drain(&mut s), 1);

        s.on_event();
        sleep(WINDOW * 2);
        assert_eq!(drain(&mut s), 1);
    }

    #[test]
    fn test_event_during_run_is_not_lost() {
        let mut s = Scheduler::new(WINDOW);
        s.on_event();
        sleep(WINDOW * 2);
        assert!(s.ready());

        s.begin();
        // A new event arrives while the rebuild is in flight
        s.on_event();
        assert!(!s.ready(), "no overlapping rebuild may start");
        assert!(s.complete(), "the mid-run event must force a follow-up");
    }

    #[test]
    fn test_no_pending_work_means_not_ready() {
        let s = Scheduler::new(WINDOW);
        assert!(!s.ready());
        assert_eq!(s.timeout(), Duration::from_secs(IDLE_TIMEOUT_SECS));
    }

    #[test]
    fn test_timeout_counts_down_from_last_event() {
        let mut s = Scheduler::new(WINDOW);
        s.on_event();
        assert!(s.timeout() <= WINDOW);

        // Re-entering the loop on unrelated traffic must not restart the
        // countdown: once the window has elapsed, the timeout is zero and
        // the very next recv_timeout fires the rebuild.
        sleep(WINDOW * 2);
        assert_eq!(s.timeout(), Duration::ZERO);
        assert!(s.ready());
    }

    #[test]
    fn test_qualifies_html_files_only() {
        assert!(qualifies(&PathBuf::from("content/math/a.html"), false));
        assert!(qualifies(&PathBuf::from("content/math/A.HTML"), false));
        assert!(!qualifies(&PathBuf::from("content/math/notes.txt"), false));
        assert!(!qualifies(&PathBuf::from("content/math/a.html.swp"), false));
        assert!(!qualifies(&PathBuf::from("content/math/.hidden.html"), false));
    }

    #[test]
    fn test_directories_always_qualify() {
        assert!(qualifies(&PathBuf::from("content/newunit"), true));
        assert!(!qualifies(&PathBuf::from("content/.git"), true));
    }
}
