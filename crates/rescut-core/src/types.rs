//! # Core Type Definitions
//!
//! Shared types for the cutoff decision engine:
//! - Per-shell statistics bundles (`ShellStatistics`, `MergingStats`,
//!   `ShellLocalStats`)
//! - Error types (`CutoffError`)
//!
//! ## Undefined Values
//!
//! Every measured statistic is an `Option`: the upstream refinement logs
//! occasionally omit a value (a negative CC-half makes CC* undefined, a
//! REFMAC run may fail to compute overall R-values). An absent statistic is
//! `None`, never `0.0` - the rating rules treat `None` explicitly, usually
//! as the worst case.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// PER-SHELL STATISTICS
// =============================================================================

/// Merging-statistics quantities for one shell, available only when
/// unmerged diffraction data was supplied to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MergingStats {
    /// CC-half of the shell; `None` when the upstream calculation failed.
    pub cc_half: Option<f64>,
    /// CC* of the shell; undefined whenever CC-half is not positive.
    pub cc_star: Option<f64>,
}

/// Statistics computed on the shell's own reflections.
///
/// Only meaningful outside complete cross-validation, and only collected
/// for the highest-resolution shell of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ShellLocalStats {
    /// Rwork restricted to the shell's reflections.
    pub rwork: Option<f64>,
    /// Rfree restricted to the shell's reflections.
    pub rfree: Option<f64>,
    /// CCwork restricted to the shell's reflections.
    pub ccwork: Option<f64>,
    /// Number of free reflections in the shell.
    pub nfree: Option<u64>,
}

/// Everything the rating engine may know about one shell transition.
///
/// A shell transition `i` is the step that extends the working resolution
/// from boundary `i` to boundary `i+1`. The overall deltas are always
/// present as a row (though either cell may be undefined); the merging and
/// shell-local bundles are absent when the corresponding input does not
/// apply to the run or to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ShellStatistics {
    /// Change of the cumulative Rwork caused by extending to this shell.
    pub rwork_delta: Option<f64>,
    /// Change of the cumulative Rfree caused by extending to this shell.
    pub rfree_delta: Option<f64>,
    /// Merging statistics; `None` when no unmerged data was supplied.
    pub merging: Option<MergingStats>,
    /// Shell-local statistics; `None` under complete cross-validation and
    /// for every shell but the highest one.
    pub local: Option<ShellLocalStats>,
}

impl ShellStatistics {
    /// Statistics carrying only the overall R-value deltas.
    #[must_use]
    pub fn from_deltas(rwork_delta: Option<f64>, rfree_delta: Option<f64>) -> Self {
        Self {
            rwork_delta,
            rfree_delta,
            merging: None,
            local: None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while assembling the cutoff suggestion.
///
/// Only structural problems are errors: a missing or empty required table
/// means the refinement pipeline did not run to completion first and the
/// engine cannot proceed. Data-quality problems (unparseable cells) are
/// never errors - they become undefined values.
#[derive(Debug, Error)]
pub enum CutoffError {
    /// A required input table does not exist.
    #[error("Required statistics table not found: {0}")]
    MissingTable(PathBuf),

    /// An input table exists but holds no data rows.
    #[error("Statistics table holds no data rows: {0}")]
    EmptyTable(PathBuf),

    /// The shell boundary sequence is not strictly decreasing, too short,
    /// or contains a non-finite value.
    #[error("Invalid shell boundary sequence: {0}")]
    ShellOrder(String),

    /// A table's row count disagrees with the shell boundary sequence.
    #[error("Table {path} has {found} data rows, expected {expected}")]
    ShellCountMismatch {
        /// The offending table.
        path: PathBuf,
        /// Data rows found in the table.
        found: usize,
        /// Data rows required by the shell sequence.
        expected: usize,
    },

    /// A cell that must be numeric for structural reasons is not
    /// (the resolution column used to derive the shell sequence).
    #[error("Table {path} row {row}: non-numeric resolution column")]
    MalformedResolution {
        /// The offending table.
        path: PathBuf,
        /// Zero-based data row index.
        row: usize,
    },

    /// A policy override file could not be parsed.
    #[error("Invalid policy file {path}: {message}")]
    InvalidPolicy {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading a table or writing the result.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

// =============================================================================
// TESTS
// =============================================================================
