//! # Resolution Shells
//!
//! The validated shell boundary sequence and the two-decimal formatting
//! used throughout the pipeline's file names and result files.
//!
//! A "shell" is a high-resolution diffraction limit in Angstrom. Paired
//! refinement walks a strictly decreasing sequence of limits - decreasing
//! Angstrom means *better* resolution - and shell transition `i` is the
//! step from boundary `i` to boundary `i+1`.

use crate::types::CutoffError;
use serde::Serialize;

/// Validated, strictly decreasing sequence of high-resolution limits (A).
///
/// Index 0 is the initial (poorest) limit. The sequence has at least two
/// boundaries, so there is always at least one transition to classify.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Shells(Vec<f64>);

impl Shells {
    /// Validate and wrap a boundary sequence.
    ///
    /// # Errors
    /// Returns [`CutoffError::ShellOrder`] when the sequence has fewer than
    /// two boundaries, contains a non-finite or non-positive value, or is
    /// not strictly decreasing.
    pub fn new(boundaries: Vec<f64>) -> Result<Self, CutoffError> {
        if boundaries.len() < 2 {
            return Err(CutoffError::ShellOrder(format!(
                "need at least two boundaries, got {}",
                boundaries.len()
            )));
        }
        for value in &boundaries {
            if !value.is_finite() || *value <= 0.0 {
                return Err(CutoffError::ShellOrder(format!(
                    "boundary {value} is not a positive resolution limit"
                )));
            }
        }
        for pair in boundaries.windows(2) {
            if pair[1] >= pair[0] {
                return Err(CutoffError::ShellOrder(format!(
                    "boundaries must strictly decrease, got {} before {}",
                    twodec(pair[0]),
                    twodec(pair[1])
                )));
            }
        }
        Ok(Self(boundaries))
    }

    /// The initial resolution limit (shell 0, the fallback cutoff).
    #[must_use]
    pub fn initial(&self) -> f64 {
        self.0[0]
    }

    /// The highest-resolution (smallest) limit of the sequence.
    #[must_use]
    pub fn highest(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Number of shell transitions (one less than the boundary count).
    #[must_use]
    pub fn transitions(&self) -> usize {
        self.0.len() - 1
    }

    /// Boundary value at `index`.
    #[must_use]
    pub fn boundary(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// All boundaries, poorest resolution first.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Format a resolution with exactly two decimals, e.g. `1.60`.
///
/// This is the formatting contract of the result file and of every
/// user-facing resolution value.
#[must_use]
pub fn twodec(value: f64) -> String {
    format!("{value:.2}")
}

/// Two-decimal formatting with `-` instead of the decimal point, e.g.
/// `1-60`; used to build per-shell file names.
#[must_use]
pub fn twodecname(value: f64) -> String {
    twodec(value).replace('.', "-")
}

// =============================================================================
// TESTS
// =============================================================================
