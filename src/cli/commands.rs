use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// `planwatch` - reconcile device inventory with software-update plan status.
#[derive(Parser, Debug)]
#[command(name = "planwatch")]
#[command(version)]
#[command(
    about = "Reconciles device inventory with software-update plans and syncs the result to inventory attributes.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.planwatch/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconciliation pass
    Run(RunArgs),

    /// Validate config, authenticate, and probe the plan endpoint (no writes)
    Check,

    /// Write a config template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Reconcile and export, but write no annotations
    #[arg(long)]
    pub dry_run: bool,

    /// Skip annotation sync entirely
    #[arg(long)]
    pub no_annotations: bool,

    /// Skip the CSV report
    #[arg(long)]
    pub no_export: bool,

    /// Create missing annotation definitions
    #[arg(long)]
    pub create_definitions: bool,

    /// Report directory (overrides export.output_dir)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Items per list request (overrides sync.page_size)
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl RunArgs {
    /// Fold the flags into a loaded config. Flags only ever switch features
    /// on or narrow behaviour; they never re-enable something the file turned
    /// off.
    pub fn apply_to(&self, config: &mut Config) {
        if self.dry_run {
            config.sync.dry_run = true;
        }
        if self.no_annotations {
            config.sync.write_annotations = false;
        }
        if self.no_export {
            config.export.enabled = false;
        }
        if self.create_definitions {
            config.sync.create_missing_definitions = true;
        }
        if let Some(dir) = self.output_dir.as_deref().map(str::trim)
            && !dir.is_empty()
        {
            config.export.output_dir = dir.to_string();
        }
        if let Some(page_size) = self.page_size {
            config.sync.page_size = page_size;
        }
    }
}
