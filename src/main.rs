//! Studymap - manifest builder and reading-progress tracker for HTML course trees.

mod build;
mod cli;
mod config;
mod manifest;
mod progress;
mod registry;
mod scan;
mod serve;
mod title;
mod utils;
mod watch;

use anyhow::{Result, bail};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use progress::{
    BadgeSync, BulkAction, FlagKind, ProgressStore, ProgressView, module_stats, term::TermView,
};
use registry::ManifestRegistry;
use serve::serve_site;
use std::path::Path;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Build => build_site(config).map(|_| ()),
        Commands::Watch => {
            // One unconditional build so the manifest set is fresh at boot,
            // regardless of watcher readiness latency.
            build_site(config)?;
            watch_for_changes_blocking(config)
        }
        Commands::Serve { .. } => {
            build_site(config)?;
            serve_site(config)
        }
        Commands::Topics { module } => show_topics(config, module),
        Commands::Mark {
            module,
            href,
            review,
        } => mark_topic(config, module, href, *review),
        Commands::MarkAll { module } => apply_bulk(config, module, BulkAction::MarkAllComplete),
        Commands::Clear { module, review } => {
            let action = if *review {
                BulkAction::ClearReview
            } else {
                BulkAction::ClearCompleted
            };
            apply_bulk(config, module, action)
        }
        Commands::Reset { module } => apply_bulk(config, module, BulkAction::ResetAll),
        Commands::Visit {
            page,
            completed,
            review,
        } => visit_page(config, page, *completed, *review),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// The config file is optional; a bare content tree runs on defaults.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Render one module's topic list with badges and the stats bar.
fn show_topics(config: &SiteConfig, module: &str) -> Result<()> {
    let registry = ManifestRegistry::load(config);
    let Some(manifest) = registry.module(module) else {
        bail!("Module `{module}` has no manifest. Run `studymap build` first.");
    };

    let store = ProgressStore::open(&config.progress.store);
    let record = store.load(module);
    let stats = module_stats(manifest, &record);

    TermView.render_all(manifest, &record, &stats);
    Ok(())
}

/// Toggle one topic flag through the badge sync layer.
fn mark_topic(config: &SiteConfig, module: &str, href: &str, review: bool) -> Result<()> {
    let registry = ManifestRegistry::load(config);
    let store = ProgressStore::open(&config.progress.store);
    let kind = if review {
        FlagKind::Review
    } else {
        FlagKind::Completed
    };

    BadgeSync::new(&registry, &store).toggle(module, kind, href, &mut TermView)?;
    Ok(())
}

/// Apply a whole-record action to one module.
fn apply_bulk(config: &SiteConfig, module: &str, action: BulkAction) -> Result<()> {
    let registry = ManifestRegistry::load(config);
    let store = ProgressStore::open(&config.progress.store);

    BadgeSync::new(&registry, &store).apply_bulk(module, action, &mut TermView)
}

/// Record a page visit in the page-scoped namespace.
fn visit_page(config: &SiteConfig, page: &str, completed: bool, review: bool) -> Result<()> {
    let store = ProgressStore::open(&config.progress.store);

    store.mark_visited(page)?;
    if completed {
        store.set_flag(page, FlagKind::Completed, true)?;
    }
    if review {
        store.set_flag(page, FlagKind::Review, true)?;
    }

    let entry = store.page(page);
    crate::log!("visit"; "{page} (last opened: {})", entry.last_opened.as_deref().unwrap_or("never"));
    Ok(())
}
