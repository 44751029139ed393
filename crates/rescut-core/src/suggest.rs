//! # Cutoff Suggestion
//!
//! Orchestration of a full suggestion run: read the statistics tables the
//! refinement pipeline left in the work directory, rate every shell
//! transition, run the decision pass, and publish the strict cutoff to the
//! result file.
//!
//! All I/O lives here; the rating and decision engines stay pure. The
//! caller owns the [`Diagnostics`] collector, so advisories survive the
//! run without any global state.

use crate::decision::{Decision, decide};
use crate::diagnostics::{Diagnostics, KEY_CC_HALF, KEY_CC_STAR, KEY_NFREE};
use crate::primitives::{CutoffPolicy, RESULT_FILENAME};
use crate::rating::{RatingCode, rate};
use crate::resolution::{Shells, twodec, twodecname};
use crate::tables::{read_highest_shell_bin, read_merging_stats, read_rgap, read_rvalues};
use crate::types::{CutoffError, MergingStats, ShellLocalStats, ShellStatistics};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// INPUT
// =============================================================================

/// Everything a suggestion run needs to know.
#[derive(Debug, Clone)]
pub struct SuggestInput {
    /// Project name; prefixes every table file name.
    pub project: String,
    /// Directory holding the statistics tables; the result file is written
    /// here as well.
    pub workdir: PathBuf,
    /// Shell boundaries, poorest resolution first. When `None` they are
    /// derived from the Rgap table's resolution column.
    pub shells: Option<Vec<f64>>,
    /// Complete cross-validation mode: overall deltas are averages over
    /// all free-flag sets and no shell-local statistics exist.
    pub complete_cross_validation: bool,
    /// Whether unmerged diffraction data was supplied (enables the
    /// merging-statistics table).
    pub unmerged_data: bool,
    /// Number of low-resolution bins preceding the shells in the
    /// merging-statistics table.
    pub n_bins_low: usize,
    /// Free-reflection flag set of the per-shell binned table.
    pub flag: u32,
    /// Policy thresholds.
    pub policy: CutoffPolicy,
}

impl SuggestInput {
    /// A plain run for `project` in `workdir` with default policy, no
    /// cross-validation and no unmerged data.
    #[must_use]
    pub fn new(project: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            workdir: workdir.into(),
            shells: None,
            complete_cross_validation: false,
            unmerged_data: false,
            n_bins_low: 0,
            flag: 0,
            policy: CutoffPolicy::default(),
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Full report of a suggestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutoffSuggestion {
    /// Shell boundaries the run classified, poorest resolution first.
    pub shells: Vec<f64>,
    /// Rating codes per shell transition.
    pub ratings: Vec<BTreeSet<RatingCode>>,
    /// The two acceptance tracks and their cutoffs.
    pub decision: Decision,
    /// The written result file.
    pub result_file: PathBuf,
}

impl CutoffSuggestion {
    /// The published cutoff (strict track), as written to the result file.
    #[must_use]
    pub fn cutoff(&self) -> f64 {
        self.decision.cutoff_strict
    }
}

// =============================================================================
// ORCHESTRATION
// =============================================================================

fn table_path(input: &SuggestInput, suffix: &str) -> PathBuf {
    input.workdir.join(format!("{}_{}", input.project, suffix))
}

/// Derive the shell boundary sequence from the Rgap resolution column.
fn shells_from_rgap(
    resolutions: &[Option<f64>],
    path: &Path,
) -> Result<Shells, CutoffError> {
    let mut boundaries = Vec::with_capacity(resolutions.len());
    for (row, resolution) in resolutions.iter().enumerate() {
        match resolution {
            Some(value) => boundaries.push(*value),
            None => {
                return Err(CutoffError::MalformedResolution {
                    path: path.to_path_buf(),
                    row,
                });
            }
        }
    }
    Shells::new(boundaries)
}

/// Run a full cutoff suggestion.
///
/// Reads the required tables (`<project>_R-values.csv`,
/// `<project>_Rgap.csv`), the optional merging-statistics table, and - in
/// non-cross-validation mode - the highest-shell binned table; rates every
/// transition; runs the decision pass; and writes the strict cutoff with
/// two decimals to `PAIREF_cutoff.txt` in the work directory.
///
/// # Errors
/// Fails only on structural problems: a missing or empty required table,
/// an invalid or mismatching shell sequence, or an I/O failure. Data
/// quality never fails a run; undefined statistics funnel into worst-case
/// rating codes instead.
pub fn suggest_cutoff(
    input: &SuggestInput,
    diagnostics: &mut Diagnostics,
) -> Result<CutoffSuggestion, CutoffError> {
    let rvalues_path = table_path(input, "R-values.csv");
    let rgap_path = table_path(input, "Rgap.csv");

    let rvalues = read_rvalues(&rvalues_path)?;
    let rgap = read_rgap(&rgap_path)?;

    // Establish the shell sequence and check every table against it.
    let shells = match &input.shells {
        Some(explicit) => Shells::new(explicit.clone())?,
        None => {
            let resolutions: Vec<Option<f64>> = rgap.iter().map(|row| row.resolution).collect();
            shells_from_rgap(&resolutions, &rgap_path)?
        }
    };
    if rgap.len() != shells.transitions() + 1 {
        return Err(CutoffError::ShellCountMismatch {
            path: rgap_path,
            found: rgap.len(),
            expected: shells.transitions() + 1,
        });
    }
    if rvalues.len() != shells.transitions() {
        return Err(CutoffError::ShellCountMismatch {
            path: rvalues_path,
            found: rvalues.len(),
            expected: shells.transitions(),
        });
    }

    // Optional merging statistics, aligned with the transitions.
    let merging = if input.unmerged_data {
        let path = table_path(input, "merging_stats.csv");
        let rows = read_merging_stats(&path, input.n_bins_low)?;
        if rows.len() < shells.transitions() {
            return Err(CutoffError::ShellCountMismatch {
                path,
                found: rows.len(),
                expected: shells.transitions(),
            });
        }
        Some(rows)
    } else {
        None
    };

    // Shell-local statistics exist only outside complete cross-validation,
    // for the highest shell of the run.
    let highest_local = if input.complete_cross_validation {
        None
    } else {
        let suffix = format!(
            "R{:02}_{}A.csv",
            input.flag,
            twodecname(shells.highest())
        );
        let bin = read_highest_shell_bin(&table_path(input, &suffix))?;
        match bin.nfree {
            Some(nfree) if nfree < input.policy.nfree_reliable => {
                diagnostics.record(
                    KEY_NFREE,
                    format!(
                        "There are only {nfree} < {} free reflections in the resolution \
                         shell {}-{} A. Values of statistics Rfree and CCfree in this \
                         shell could be misleading. Consider setting thicker resolution \
                         shells.",
                        input.policy.nfree_reliable,
                        twodec(shells.boundary(shells.transitions() - 1)),
                        twodec(shells.highest()),
                    ),
                );
            }
            None => {
                diagnostics.record(
                    KEY_NFREE,
                    format!(
                        "The number of free reflections in the resolution shell {}-{} A \
                         could not be determined.",
                        twodec(shells.boundary(shells.transitions() - 1)),
                        twodec(shells.highest()),
                    ),
                );
            }
            Some(_) => {}
        }
        Some(ShellLocalStats {
            rwork: bin.rwork,
            rfree: bin.rfree,
            ccwork: bin.ccwork,
            nfree: bin.nfree,
        })
    };

    // Assemble per-transition statistics and rate them.
    let last = shells.transitions() - 1;
    let mut ratings = Vec::with_capacity(shells.transitions());
    for i in 0..shells.transitions() {
        let merging_stats = merging.as_ref().map(|rows| {
            let row = rows[i];
            if row.cc_half.is_none_or(|cc| cc <= 0.0) {
                diagnostics.record(
                    KEY_CC_HALF,
                    format!(
                        "CC1/2 is not positive or undefined in the resolution shell \
                         {}-{} A.",
                        twodec(shells.boundary(i)),
                        twodec(shells.boundary(i + 1)),
                    ),
                );
            } else if row.cc_star.is_none() {
                diagnostics.record(
                    KEY_CC_STAR,
                    format!(
                        "A CC* value could not be calculated for the resolution shell \
                         {}-{} A.",
                        twodec(shells.boundary(i)),
                        twodec(shells.boundary(i + 1)),
                    ),
                );
            }
            MergingStats {
                cc_half: row.cc_half,
                cc_star: row.cc_star,
            }
        });

        let stats = ShellStatistics {
            rwork_delta: rvalues[i].rwork_delta,
            rfree_delta: rvalues[i].rfree_delta,
            merging: merging_stats,
            local: if i == last { highest_local } else { None },
        };
        ratings.push(rate(&stats, &input.policy));
    }

    let decision = decide(&shells, &ratings, &rgap, &input.policy);

    // Publish the strict cutoff; sole artifact for downstream reporting.
    let result_file = input.workdir.join(RESULT_FILENAME);
    fs::write(&result_file, format!("{}\n", twodec(decision.cutoff_strict))).map_err(|source| {
        CutoffError::Io {
            path: result_file.clone(),
            source,
        }
    })?;

    Ok(CutoffSuggestion {
        shells: shells.as_slice().to_vec(),
        ratings,
        decision,
        result_file,
    })
}

// =============================================================================
// TESTS
// =============================================================================
