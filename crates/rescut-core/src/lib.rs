//! # rescut-core
//!
//! The deterministic cutoff decision engine for rescut - THE LOGIC.
//!
//! Paired refinement re-refines a structure model against diffraction data
//! truncated at progressively higher resolution and asks, shell by shell,
//! whether the added data improved the model. This crate implements the part
//! of that workflow with nontrivial decision logic: it ingests the per-shell
//! statistics tables written by the refinement pipeline, attaches a set of
//! rating codes to every resolution shell, and runs two acceptance tracks
//! (strict and benevolent) over the shells in order to suggest the optimal
//! high-resolution cutoff together with a human-auditable reason trail.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust, no async, no network dependencies
//! - Single-pass and deterministic: identical inputs give identical output
//! - The rating and decision engines are pure functions; all I/O happens at
//!   the edges (`tables` for input, `suggest` for the result file)
//! - Data-quality problems never abort a run - an unparseable statistic is
//!   an explicit undefined value that funnels to the worst-case rating
//!
//! Out of scope by design: invoking REFMAC5/phenix.refine, parsing their
//! logs, plotting, and HTML reporting. Those collaborators run first and
//! leave the tables this crate consumes.

// =============================================================================
// MODULES
// =============================================================================

pub mod decision;
pub mod diagnostics;
pub mod primitives;
pub mod rating;
pub mod resolution;
pub mod suggest;
pub mod tables;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CutoffError, MergingStats, ShellLocalStats, ShellStatistics};

// =============================================================================
// RE-EXPORTS: Engines
// =============================================================================

pub use decision::{Decision, ShellVerdict, decide};
pub use diagnostics::Diagnostics;
pub use primitives::{CutoffPolicy, PROPAGATION_PHRASE, RESULT_FILENAME};
pub use rating::{RatingCode, Severity, rate};
pub use resolution::{Shells, twodec, twodecname};
pub use suggest::{CutoffSuggestion, SuggestInput, suggest_cutoff};

// =============================================================================
// RE-EXPORTS: Table Reader
// =============================================================================

pub use tables::{
    HighestShellBin, MergingRow, RgapRow, RvaluesRow, read_highest_shell_bin, read_merging_stats,
    read_rgap, read_rvalues,
};
