//! # Rescut CLI Module
//!
//! This module implements the CLI interface for rescut.
//!
//! ## Available Commands
//!
//! - `suggest` - Run the paired-refinement cutoff suggestion
//! - `policy` - Print the effective policy thresholds

mod commands;

use clap::{Parser, Subcommand};
use rescut_core::CutoffError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Rescut - Paired Refinement Cutoff Suggestion
///
/// Classifies the per-shell statistics left by a paired-refinement run and
/// suggests the optimal high-resolution cutoff, with a per-shell audit trail.
#[derive(Parser, Debug)]
#[command(name = "rescut")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest a resolution cutoff from the statistics tables
    Suggest {
        /// Project name (prefix of the statistics table files)
        #[arg(short, long)]
        project: String,

        /// Directory holding the statistics tables
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Shell boundaries, comma-separated, poorest resolution first
        /// (derived from the Rgap table when omitted)
        #[arg(short, long, value_delimiter = ',')]
        shells: Option<Vec<f64>>,

        /// Overall deltas are averaged over all free-flag sets; no
        /// shell-local statistics
        #[arg(long)]
        complete_cross_validation: bool,

        /// Unmerged diffraction data was supplied (enables the
        /// merging-statistics table)
        #[arg(short, long)]
        unmerged: bool,

        /// Low-resolution bins preceding the shells in the
        /// merging-statistics table
        #[arg(short, long, default_value = "0")]
        n_bins_low: usize,

        /// Free-reflection flag set of the per-shell binned table
        #[arg(short, long, default_value = "0")]
        flag: u32,

        /// TOML file overriding the policy thresholds
        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Print the effective policy thresholds
    Policy {
        /// TOML file overriding the policy thresholds
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CutoffError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Suggest {
            project,
            dir,
            shells,
            complete_cross_validation,
            unmerged,
            n_bins_low,
            flag,
            policy,
        } => cmd_suggest(
            &project,
            &dir,
            shells,
            complete_cross_validation,
            unmerged,
            n_bins_low,
            flag,
            policy.as_deref(),
            json_mode,
        ),
        Commands::Policy { policy } => cmd_policy(policy.as_deref(), json_mode),
    }
}
