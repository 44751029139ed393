//! # Rescut - Resolution Cutoff Suggestion
//!
//! The main binary for the rescut paired-refinement cutoff engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/rescut (THE BINARY)                │
//! │                                                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │   CLI       │   │ Policy file  │   │  Reporting   │  │
//! │  │  (clap)     │   │   (toml)     │   │ (text/JSON)  │  │
//! │  └──────┬──────┘   └──────┬───────┘   └──────┬───────┘  │
//! │         │                 │                  │          │
//! │         └─────────────────┼──────────────────┘          │
//! │                           ▼                             │
//! │                   ┌───────────────┐                     │
//! │                   │  rescut-core  │                     │
//! │                   │  (THE LOGIC)  │                     │
//! │                   └───────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Suggest a cutoff from the tables in the current directory
//! rescut suggest -p lysozyme
//!
//! # With merging statistics and a policy override file
//! rescut suggest -p lysozyme -d ./run3 --unmerged --n-bins-low 5 --policy strict.toml
//! ```

use clap::Parser;
use rescut::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — RESCUT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("RESCUT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rescut=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the rescut startup banner.
fn print_banner() {
    println!(
        r"
  ██████╗ ███████╗███████╗ ██████╗██╗   ██╗████████╗
  ██╔══██╗██╔════╝██╔════╝██╔════╝██║   ██║╚══██╔══╝
  ██████╔╝█████╗  ███████╗██║     ██║   ██║   ██║
  ██╔══██╗██╔══╝  ╚════██║██║     ██║   ██║   ██║
  ██║  ██║███████╗███████║╚██████╗╚██████╔╝   ██║
  ╚═╝  ╚═╝╚══════╝╚══════╝ ╚═════╝ ╚═════╝    ╚═╝

  Paired Refinement Cutoff Suggestion v{}

  Deterministic • Auditable • Shell by Shell
",
        env!("CARGO_PKG_VERSION")
    );
}
