//! # Cutoff Decision Engine
//!
//! Consumes per-shell ratings in shell order (toward higher resolution) and
//! produces two accept/reject tracks:
//!
//! - **strict**: a shell is accepted only when nothing beyond the mild tier
//!   fired, and once a shell is rejected every later shell is rejected too.
//!   The strict cutoff is the value written to the result file.
//! - **benevolent**: tolerates mid-tier shell-local codes (5, 6), rejects
//!   on code 7 or anything worse, limits propagation with a two-in-a-row
//!   lookback, and can retroactively accept a transient code-7 regression
//!   when the Rfree-Rwork gap series shows the next shell recovered it.
//!
//! The engine never errors: every rating set is classifiable, and both
//! cutoffs fall back to the initial resolution limit when no shell is
//! accepted.

use crate::primitives::{CutoffPolicy, PROPAGATION_PHRASE};
use crate::rating::{RatingCode, Severity};
use crate::resolution::Shells;
use crate::tables::RgapRow;
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// VERDICTS
// =============================================================================

/// Outcome for one shell transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellVerdict {
    /// Boundary the transition starts from (poorer resolution, A).
    pub res_from: f64,
    /// Boundary the transition extends to (better resolution, A).
    pub res_to: f64,
    /// Accepted on the strict track.
    pub accepted_strict: bool,
    /// Accepted on the benevolent track (may be set retroactively by the
    /// compensation rule).
    pub accepted_benevolent: bool,
    /// Human-readable rationale, worst code first. Rejections inherited
    /// from an earlier shell are prefixed with a fixed phrase.
    pub reasons: Vec<String>,
}

/// Result of a full decision pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// Cutoff suggested by the strict track (the published value).
    pub cutoff_strict: f64,
    /// Cutoff suggested by the benevolent track.
    pub cutoff_benevolent: f64,
    /// Per-transition outcomes, in shell order.
    pub verdicts: Vec<ShellVerdict>,
}

// =============================================================================
// DECISION PASS
// =============================================================================

/// Worst code of a rating set under the severity ordering.
fn worst_of(codes: &BTreeSet<RatingCode>) -> Option<RatingCode> {
    codes.iter().next_back().copied()
}

/// Check whether the Rfree-Rwork gap series shows that the shell after a
/// code-7 regression recovered it: the two-shell span delta must match the
/// code-1 pattern (Rfree did not increase) or the code-2 pattern (Rfree
/// flat while Rwork rose). The gap series is measured from the initial
/// resolution limit, not the pairwise shell-to-shell deltas.
fn span_recovers(rgap: &[RgapRow], transition: usize, policy: &CutoffPolicy) -> bool {
    let (Some(before), Some(after)) = (rgap.get(transition - 1), rgap.get(transition + 1)) else {
        return false;
    };
    let span = |a: Option<f64>, b: Option<f64>| Some(b? - a?);
    let rfree_span = span(before.rfree, after.rfree);
    let rwork_span = span(before.rwork, after.rwork);

    rfree_span.is_some_and(|d| d <= policy.rfree_delta_flat)
        || (rfree_span.is_some_and(|d| d <= policy.rfree_delta_tolerated)
            && rwork_span.is_some_and(|d| d > 0.0))
}

/// Run the decision pass over all shell transitions.
///
/// `ratings[i]` rates the transition from `shells.boundary(i)` to
/// `shells.boundary(i+1)`; `rgap` is the Rfree-Rwork gap series with one
/// row per boundary, used only by the benevolent compensation rule (a
/// missing row simply makes compensation fail).
///
/// Deterministic single left-to-right pass; identical inputs give an
/// identical `Decision`.
#[must_use]
pub fn decide(
    shells: &Shells,
    ratings: &[BTreeSet<RatingCode>],
    rgap: &[RgapRow],
    policy: &CutoffPolicy,
) -> Decision {
    let n = ratings.len().min(shells.transitions());

    let mut verdicts: Vec<ShellVerdict> = Vec::with_capacity(n);
    // Benevolent rejections caused by the shell's own worst code being
    // exactly 7 - the only rejections the compensation rule may undo.
    let mut own_code7 = vec![false; n];
    let mut cutoff_strict = shells.initial();
    let mut cutoff_benevolent = shells.initial();

    for i in 0..n {
        let worst = worst_of(&ratings[i]);
        let worst_tier = worst.map_or(Severity::Mild, RatingCode::severity);

        // Strict track: no recovery once a shell is rejected.
        let strict_propagated = i > 0 && !verdicts[i - 1].accepted_strict;
        let accepted_strict = !strict_propagated && worst_tier == Severity::Mild;
        if accepted_strict {
            cutoff_strict = shells.boundary(i + 1);
        }

        // Benevolent track.
        let own_reject =
            worst_tier == Severity::Worst || worst == Some(RatingCode::OverallRfreeIncreased);
        let mut benevolent_propagated = false;
        let mut compensated_previous = false;
        let accepted_benevolent = if own_reject {
            own_code7[i] = worst == Some(RatingCode::OverallRfreeIncreased);
            false
        } else if i >= 1 && !verdicts[i - 1].accepted_benevolent {
            if i >= 2 && !verdicts[i - 2].accepted_benevolent {
                // Two rejected shells in a row end the chain for good.
                benevolent_propagated = true;
                false
            } else if own_code7[i - 1] {
                if span_recovers(rgap, i, policy) {
                    // This shell compensates the transient regression.
                    compensated_previous = true;
                    true
                } else {
                    benevolent_propagated = true;
                    false
                }
            } else {
                // The previous shell fell on a hard violation (worse than 7).
                benevolent_propagated = true;
                false
            }
        } else {
            true
        };

        if compensated_previous {
            verdicts[i - 1].accepted_benevolent = true;
        }
        if accepted_benevolent {
            cutoff_benevolent = shells.boundary(i + 1);
        }

        // Reason trail: fixed propagation phrase first when the rejection
        // was inherited rather than earned, then the shell's own codes,
        // worst first.
        let mut reasons = Vec::new();
        if benevolent_propagated || (strict_propagated && worst_tier == Severity::Mild) {
            reasons.push(PROPAGATION_PHRASE.to_string());
        }
        reasons.extend(ratings[i].iter().rev().map(|code| code.reason().to_string()));

        verdicts.push(ShellVerdict {
            res_from: shells.boundary(i),
            res_to: shells.boundary(i + 1),
            accepted_strict,
            accepted_benevolent,
            reasons,
        });
    }

    Decision {
        cutoff_strict,
        cutoff_benevolent,
        verdicts,
    }
}

// =============================================================================
// TESTS
// =============================================================================
