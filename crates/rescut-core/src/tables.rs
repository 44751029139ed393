//! # Statistics Table Reader
//!
//! Parsers for the small tabular files the refinement pipeline leaves
//! behind. All tables are newline-delimited with whitespace-separated
//! columns; rows whose first non-whitespace character is `#` are comments.
//!
//! ## Undefined Cells
//!
//! A cell that is missing or does not parse as a number resolves to `None`.
//! It never becomes `0.0` and it never aborts the read: the upstream logs
//! legitimately contain `N/A` cells (e.g. CC* for a negative CC-half), and
//! a multi-hour pipeline must not crash over one of them. Only structural
//! problems - a missing file, a table without data rows - are errors.

use crate::types::CutoffError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// Column layout of the overall R-values table:
// shell label, Rwork(init), Rwork(fin), Rwork(diff), Rfree(init),
// Rfree(fin), Rfree(diff). Only the diff columns feed the rating engine.
const RVALUES_RWORK_DIFF: usize = 3;
const RVALUES_RFREE_DIFF: usize = 6;

// Column layout of the per-shell binned table:
// shell number, res_low, "-", res_high, Nwork, Nfree, Rwork, Rfree,
// CCwork, CCfree.
const BIN_NWORK: usize = 4;
const BIN_NFREE: usize = 5;
const BIN_RWORK: usize = 6;
const BIN_RFREE: usize = 7;
const BIN_CCWORK: usize = 8;

// =============================================================================
// ROW TYPES
// =============================================================================

/// One shell transition of the overall R-values table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RvaluesRow {
    /// Change of the cumulative Rwork caused by this transition.
    pub rwork_delta: Option<f64>,
    /// Change of the cumulative Rfree caused by this transition.
    pub rfree_delta: Option<f64>,
}

/// One model of the Rfree-Rwork gap table, measured at the initial limit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgapRow {
    /// High-resolution limit the model was refined to.
    pub resolution: Option<f64>,
    /// Overall Rwork of the model.
    pub rwork: Option<f64>,
    /// Overall Rfree of the model.
    pub rfree: Option<f64>,
    /// Rfree - Rwork.
    pub gap: Option<f64>,
}

/// One shell of the merging-statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MergingRow {
    /// CC-half of the shell (second-to-last column).
    pub cc_half: Option<f64>,
    /// CC* of the shell (last column).
    pub cc_star: Option<f64>,
}

/// Shell-local statistics of the highest-resolution shell, taken from the
/// last row of the per-flag binned table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HighestShellBin {
    /// Working reflections in the shell.
    pub nwork: Option<u64>,
    /// Free reflections in the shell.
    pub nfree: Option<u64>,
    /// Rwork restricted to the shell.
    pub rwork: Option<f64>,
    /// Rfree restricted to the shell.
    pub rfree: Option<f64>,
    /// CCwork restricted to the shell.
    pub ccwork: Option<f64>,
}

// =============================================================================
// READER CORE
// =============================================================================

/// Split a table into data rows, dropping comments and blank lines.
fn data_rows(path: &Path) -> Result<Vec<Vec<String>>, CutoffError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CutoffError::MissingTable(path.to_path_buf())
        } else {
            CutoffError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let rows: Vec<Vec<String>> = text
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect();

    if rows.is_empty() {
        return Err(CutoffError::EmptyTable(path.to_path_buf()));
    }
    Ok(rows)
}

/// Parse a float cell; anything unparseable or non-finite is undefined.
fn cell_f64(row: &[String], index: usize) -> Option<f64> {
    row.get(index)
        .and_then(|cell| cell.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Parse a count cell; anything unparseable is undefined.
fn cell_u64(row: &[String], index: usize) -> Option<u64> {
    row.get(index).and_then(|cell| cell.parse::<u64>().ok())
}

// =============================================================================
// TYPED LOADERS
// =============================================================================

/// Read the overall R-values table (`<project>_R-values.csv`).
///
/// One row per shell transition; only the Rwork/Rfree diff columns are
/// extracted.
pub fn read_rvalues(path: &Path) -> Result<Vec<RvaluesRow>, CutoffError> {
    let rows = data_rows(path)?;
    Ok(rows
        .iter()
        .map(|row| RvaluesRow {
            rwork_delta: cell_f64(row, RVALUES_RWORK_DIFF),
            rfree_delta: cell_f64(row, RVALUES_RFREE_DIFF),
        })
        .collect())
}

/// Read the Rfree-Rwork gap table (`<project>_Rgap.csv`).
///
/// Row 0 is the model at the initial limit; row `i` the model refined to
/// boundary `i`. The series doubles as the lookback source for the
/// benevolent track's compensation rule.
pub fn read_rgap(path: &Path) -> Result<Vec<RgapRow>, CutoffError> {
    let rows = data_rows(path)?;
    Ok(rows
        .iter()
        .map(|row| RgapRow {
            resolution: cell_f64(row, 0),
            rwork: cell_f64(row, 1),
            rfree: cell_f64(row, 2),
            gap: cell_f64(row, 3),
        })
        .collect())
}

/// Read the merging-statistics table (`<project>_merging_stats.csv`).
///
/// The first `n_bins_low` data rows are low-resolution bins and are
/// skipped; the remaining rows align with the shell transitions. CC-half is
/// the second-to-last column and CC* the last one.
pub fn read_merging_stats(path: &Path, n_bins_low: usize) -> Result<Vec<MergingRow>, CutoffError> {
    let rows = data_rows(path)?;
    let shell_rows: Vec<MergingRow> = rows
        .iter()
        .skip(n_bins_low)
        .map(|row| {
            let width = row.len();
            if width < 2 {
                return MergingRow::default();
            }
            MergingRow {
                cc_half: cell_f64(row, width - 2),
                cc_star: cell_f64(row, width - 1),
            }
        })
        .collect();

    if shell_rows.is_empty() {
        return Err(CutoffError::EmptyTable(path.to_path_buf()));
    }
    Ok(shell_rows)
}

/// Read the last row of a per-flag binned table
/// (`<project>_R<flag>_<shell>A.csv`), holding the shell-local statistics
/// of the highest-resolution shell.
pub fn read_highest_shell_bin(path: &Path) -> Result<HighestShellBin, CutoffError> {
    let rows = data_rows(path)?;
    // data_rows guarantees at least one row
    let last = &rows[rows.len() - 1];
    Ok(HighestShellBin {
        nwork: cell_u64(last, BIN_NWORK),
        nfree: cell_u64(last, BIN_NFREE),
        rwork: cell_f64(last, BIN_RWORK),
        rfree: cell_f64(last, BIN_RFREE),
        ccwork: cell_f64(last, BIN_CCWORK),
    })
}

// =============================================================================
// TESTS
// =============================================================================
