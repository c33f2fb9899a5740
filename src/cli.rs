//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Studymap course manifest and progress CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Course root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to course root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Config file name (default: studymap.toml)
    #[arg(short = 'C', long, default_value = "studymap.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rebuild every module manifest and the site manifest once
    Build,

    /// Build once, then watch the content tree and rebuild on change
    Watch,

    /// Serve the course tree over HTTP. Rebuild manifests on change
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// List a module's topics with completion badges and progress stats
    Topics {
        /// Module name (directory under the content root)
        module: String,
    },

    /// Toggle the completed (or review) flag of one topic
    Mark {
        /// Module name
        module: String,

        /// Topic href, relative to the module root
        href: String,

        /// Toggle the review flag instead of completed
        #[arg(long)]
        review: bool,
    },

    /// Mark every topic of a module as completed
    MarkAll {
        /// Module name
        module: String,
    },

    /// Clear completed (or review) flags of a module
    Clear {
        /// Module name
        module: String,

        /// Clear review flags instead of completed
        #[arg(long)]
        review: bool,
    },

    /// Reset all progress flags of a module
    Reset {
        /// Module name
        module: String,
    },

    /// Record a page visit and optionally set its flags
    Visit {
        /// Page path plus query string, e.g. "content/math/unit1/limits.html"
        page: String,

        /// Set the completed flag for this page
        #[arg(long)]
        completed: bool,

        /// Set the review flag for this page
        #[arg(long)]
        review: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build)
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch)
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
