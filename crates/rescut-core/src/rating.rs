//! # Shell Rating Engine
//!
//! Classification of one shell transition into integer rating codes 1-12.
//! Each code names one way the shell's statistics indicate degradation or
//! improvement; a shell can carry several codes at once.
//!
//! `rate()` is a pure function of the shell's own statistics and the
//! policy. No mutation, no I/O - advisories triggered by the underlying
//! data (low Nfree, undefined CC*) are recorded by the orchestration layer
//! when it assembles the statistics, not here.
//!
//! ## Severity
//!
//! The severity ranking is NOT the numeric code ordering. Codes fall into
//! three tiers: mild {1,2,3,4} < mid {5,6,7} < worst {8,9,10,11,12}.
//! `Ord` on [`RatingCode`] compares by tier first, so the maximum of a
//! rating set is its worst code.

use crate::primitives::CutoffPolicy;
use crate::types::ShellStatistics;
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// SEVERITY TIERS
// =============================================================================

/// Severity tier of a rating code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// The shell is acceptable on both tracks.
    Mild,
    /// Suspicious; rejected by the strict track only, except code 7 which
    /// both tracks reject.
    Mid,
    /// Unacceptable on both tracks.
    Worst,
}

// =============================================================================
// RATING CODES
// =============================================================================

/// One way a shell's statistics indicate degradation or improvement.
///
/// The discriminants are the historical code numbers and part of the
/// reporting contract; the severity ranking lives in [`RatingCode::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum RatingCode {
    /// 1: overall Rfree did not increase - the best outcome.
    OverallRfreeDecreased = 1,
    /// 2: overall Rfree rose within tolerance while Rwork rose.
    OverallRfreeTolerated = 2,
    /// 3: shell Rfree elevated, too few free reflections to be sure.
    ShellRfreeElevatedLowNfree = 3,
    /// 4: shell Rfree high, too few free reflections to be sure.
    ShellRfreeHighLowNfree = 4,
    /// 5: shell Rfree elevated (0.40 to 0.45).
    ShellRfreeElevated = 5,
    /// 6: shell Rwork elevated (0.40 to 0.45).
    ShellRworkElevated = 6,
    /// 7: overall Rfree increased beyond tolerance.
    OverallRfreeIncreased = 7,
    /// 8: shell Rfree at or above 0.45, or undefined.
    ShellRfreeHigh = 8,
    /// 9: shell Rwork at or above 0.45, or undefined.
    ShellRworkHigh = 9,
    /// 10: CC* undefined or below CCwork - the model fits noise.
    CcStarBelowCcWork = 10,
    /// 11: CC-half not positive or undefined - no signal in the shell.
    CcHalfNonPositive = 11,
    /// 12: overall Rwork rose by more than the hard limit.
    OverallRworkJump = 12,
}

impl RatingCode {
    /// The historical integer code (1-12).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Severity tier of this code.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::OverallRfreeDecreased
            | Self::OverallRfreeTolerated
            | Self::ShellRfreeElevatedLowNfree
            | Self::ShellRfreeHighLowNfree => Severity::Mild,
            Self::ShellRfreeElevated | Self::ShellRworkElevated | Self::OverallRfreeIncreased => {
                Severity::Mid
            }
            Self::ShellRfreeHigh
            | Self::ShellRworkHigh
            | Self::CcStarBelowCcWork
            | Self::CcHalfNonPositive
            | Self::OverallRworkJump => Severity::Worst,
        }
    }

    /// Human-readable reason template for the audit trail.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::OverallRfreeDecreased => "Overall Rfree value did not increase.",
            Self::OverallRfreeTolerated => {
                "Overall Rfree value rose only within tolerance while Rwork rose."
            }
            Self::ShellRfreeElevatedLowNfree => {
                "Rfree value in the shell is in the range 0.40-0.45 \
                 (too few free reflections for a reliable estimate)."
            }
            Self::ShellRfreeHighLowNfree => {
                "Rfree value in the shell is 0.45 or higher \
                 (too few free reflections for a reliable estimate)."
            }
            Self::ShellRfreeElevated => "Rfree value in the shell is in the range 0.40-0.45.",
            Self::ShellRworkElevated => "Rwork value in the shell is in the range 0.40-0.45.",
            Self::OverallRfreeIncreased => "Overall Rfree value increased.",
            Self::ShellRfreeHigh => "Rfree value in the shell is 0.45 or higher or undefined.",
            Self::ShellRworkHigh => "Rwork value in the shell is 0.45 or higher or undefined.",
            Self::CcStarBelowCcWork => {
                "CCwork value in the shell is higher than CC* or CC* is undefined."
            }
            Self::CcHalfNonPositive => "CC1/2 value in the shell is not positive or undefined.",
            Self::OverallRworkJump => "Overall Rwork value increased considerably.",
        }
    }
}

// Severity ranking, not numeric code ranking: the worst code of a rating
// set must be its maximum.
impl Ord for RatingCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.severity(), self.code()).cmp(&(other.severity(), other.code()))
    }
}

impl PartialOrd for RatingCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// RATING RULES
// =============================================================================

/// Compare an optional statistic against a lower bound, treating an
/// undefined value as exceeding the bound (worst case).
fn at_least_or_undefined(value: Option<f64>, bound: f64) -> bool {
    value.is_none_or(|v| v >= bound)
}

/// Rate one shell transition.
///
/// Evaluates every rule independently; the returned set can carry several
/// codes. Exactly one of codes {12, 1, 2, 7} is always present (priority
/// 12 -> 1 -> 2 -> 7, first match wins), so the set is never empty.
#[must_use]
pub fn rate(stats: &ShellStatistics, policy: &CutoffPolicy) -> BTreeSet<RatingCode> {
    let mut codes = BTreeSet::new();

    // Merging-statistics rules (11 short-circuits 10).
    if let Some(merging) = stats.merging {
        if merging.cc_half.is_none_or(|cc| cc <= 0.0) {
            codes.insert(RatingCode::CcHalfNonPositive);
        } else {
            let ccwork = stats.local.and_then(|local| local.ccwork);
            let star_below_work = match (merging.cc_star, ccwork) {
                (None, _) => true,
                (Some(star), Some(work)) => star < work,
                (Some(_), None) => false,
            };
            if star_below_work {
                codes.insert(RatingCode::CcStarBelowCcWork);
            }
        }
    }

    // Shell-local rules; the local bundle exists only outside complete
    // cross-validation, for the highest shell of the run.
    if let Some(local) = stats.local {
        if at_least_or_undefined(local.rwork, policy.r_high) {
            codes.insert(RatingCode::ShellRworkHigh);
        } else if at_least_or_undefined(local.rwork, policy.r_elevated) {
            codes.insert(RatingCode::ShellRworkElevated);
        }

        // An undefined Nfree counts as unreliable, like a low count.
        let nfree_reliable = local
            .nfree
            .is_some_and(|nfree| nfree >= policy.nfree_reliable);
        if at_least_or_undefined(local.rfree, policy.r_high) {
            codes.insert(if nfree_reliable {
                RatingCode::ShellRfreeHigh
            } else {
                RatingCode::ShellRfreeHighLowNfree
            });
        } else if at_least_or_undefined(local.rfree, policy.r_elevated) {
            codes.insert(if nfree_reliable {
                RatingCode::ShellRfreeElevated
            } else {
                RatingCode::ShellRfreeElevatedLowNfree
            });
        }
    }

    // Overall-delta rules: mutually exclusive, first match wins. An
    // undefined delta fails its comparison and falls through to code 7.
    let rwork_delta = stats.rwork_delta;
    let rfree_delta = stats.rfree_delta;
    let overall = if rwork_delta.is_some_and(|d| d > policy.rwork_delta_limit) {
        RatingCode::OverallRworkJump
    } else if rfree_delta.is_some_and(|d| d <= policy.rfree_delta_flat) {
        RatingCode::OverallRfreeDecreased
    } else if rfree_delta.is_some_and(|d| d <= policy.rfree_delta_tolerated)
        && rwork_delta.is_some_and(|d| d > 0.0)
    {
        RatingCode::OverallRfreeTolerated
    } else {
        RatingCode::OverallRfreeIncreased
    };
    codes.insert(overall);

    codes
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MergingStats, ShellLocalStats};

    fn policy() -> CutoffPolicy {
        CutoffPolicy::default()
    }

    fn worst(codes: &BTreeSet<RatingCode>) -> RatingCode {
        *codes.iter().next_back().expect("non-empty")
    }

    #[test]
    fn severity_ordering_crosses_code_numbers() {
        // 7 is mid tier, 8 is worst tier; numeric neighbors but different tiers
        assert!(RatingCode::OverallRfreeIncreased < RatingCode::ShellRfreeHigh);
        // 12 is worst tier even though 12 > 11 numerically within the tier
        assert!(RatingCode::CcHalfNonPositive < RatingCode::OverallRworkJump);
        // 4 is mild, 5 is mid
        assert!(RatingCode::ShellRfreeHighLowNfree < RatingCode::ShellRfreeElevated);
    }

    #[test]
    fn exactly_one_overall_code_fires() {
        let cases = [
            (Some(0.02), Some(0.0005)),  // 12
            (Some(0.0001), Some(-0.01)), // 1
            (Some(0.0001), Some(0.0001)),// 2
            (None, None),                // 7
        ];
        for (rwork_delta, rfree_delta) in cases {
            let codes = rate(&ShellStatistics::from_deltas(rwork_delta, rfree_delta), &policy());
            let overall: Vec<_> = codes
                .iter()
                .filter(|c| {
                    matches!(
                        c,
                        RatingCode::OverallRworkJump
                            | RatingCode::OverallRfreeDecreased
                            | RatingCode::OverallRfreeTolerated
                            | RatingCode::OverallRfreeIncreased
                    )
                })
                .collect();
            assert_eq!(overall.len(), 1);
        }
    }

    #[test]
    fn rwork_jump_takes_priority_over_rfree_decrease() {
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.02), Some(-0.001)),
            &policy(),
        );
        assert!(codes.contains(&RatingCode::OverallRworkJump));
        assert!(!codes.contains(&RatingCode::OverallRfreeDecreased));
    }

    #[test]
    fn rfree_flat_boundary_is_inclusive_of_tolerance() {
        // Exactly under the flat tolerance -> code 1
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0001), Some(0.00000899)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeDecreased);

        // Just above -> no longer code 1 (falls to code 2 here since Rwork rose)
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0001), Some(0.0000091)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeTolerated);
    }

    #[test]
    fn rfree_tolerated_boundary() {
        // Under the tolerated band with Rwork rising -> code 2
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0001), Some(0.000209)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeTolerated);

        // 0.00020901 is beyond the band -> code 7
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0001), Some(0.00020901)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeIncreased);

        // 0.0002091 likewise
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0001), Some(0.0002091)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeIncreased);
    }

    #[test]
    fn tolerated_requires_rwork_rise() {
        // Flat Rwork: the small Rfree rise is not excused by code 2
        let codes = rate(
            &ShellStatistics::from_deltas(Some(0.0), Some(0.0001)),
            &policy(),
        );
        assert_eq!(worst(&codes), RatingCode::OverallRfreeIncreased);
    }

    #[test]
    fn undefined_deltas_fall_through_to_code_7() {
        let codes = rate(&ShellStatistics::from_deltas(None, None), &policy());
        assert_eq!(worst(&codes), RatingCode::OverallRfreeIncreased);
    }

    #[test]
    fn negative_cc_half_yields_code_11_and_short_circuits_10() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(-0.05),
                cc_star: None,
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        let codes = rate(&stats, &policy());
        assert!(codes.contains(&RatingCode::CcHalfNonPositive));
        assert!(!codes.contains(&RatingCode::CcStarBelowCcWork));
    }

    #[test]
    fn undefined_cc_half_yields_code_11() {
        let stats = ShellStatistics {
            merging: Some(MergingStats::default()),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        assert!(rate(&stats, &policy()).contains(&RatingCode::CcHalfNonPositive));
    }

    #[test]
    fn undefined_cc_star_yields_code_10() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(0.3),
                cc_star: None,
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        let codes = rate(&stats, &policy());
        assert!(codes.contains(&RatingCode::CcStarBelowCcWork));
        assert!(!codes.contains(&RatingCode::CcHalfNonPositive));
    }

    #[test]
    fn cc_star_below_ccwork_yields_code_10() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(0.5),
                cc_star: Some(0.81),
            }),
            local: Some(ShellLocalStats {
                ccwork: Some(0.88),
                nfree: Some(1000),
                rwork: Some(0.20),
                rfree: Some(0.24),
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        assert!(rate(&stats, &policy()).contains(&RatingCode::CcStarBelowCcWork));
    }

    #[test]
    fn cc_star_above_ccwork_is_clean() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(0.9),
                cc_star: Some(0.97),
            }),
            local: Some(ShellLocalStats {
                ccwork: Some(0.91),
                nfree: Some(1000),
                rwork: Some(0.20),
                rfree: Some(0.24),
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        let codes = rate(&stats, &policy());
        assert!(!codes.contains(&RatingCode::CcStarBelowCcWork));
        assert!(!codes.contains(&RatingCode::CcHalfNonPositive));
    }

    #[test]
    fn cc_star_defined_but_ccwork_undefined_does_not_fire_10() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(0.5),
                cc_star: Some(0.81),
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        assert!(!rate(&stats, &policy()).contains(&RatingCode::CcStarBelowCcWork));
    }

    #[test]
    fn no_merging_stats_never_fires_10_or_11() {
        let stats = ShellStatistics::from_deltas(None, None);
        let codes = rate(&stats, &policy());
        assert!(!codes.contains(&RatingCode::CcHalfNonPositive));
        assert!(!codes.contains(&RatingCode::CcStarBelowCcWork));
    }

    #[test]
    fn shell_rwork_tiers() {
        let mk = |rwork| ShellStatistics {
            local: Some(ShellLocalStats {
                rwork,
                rfree: Some(0.25),
                ccwork: None,
                nfree: Some(200),
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        assert!(rate(&mk(Some(0.45)), &policy()).contains(&RatingCode::ShellRworkHigh));
        assert!(rate(&mk(None), &policy()).contains(&RatingCode::ShellRworkHigh));
        assert!(rate(&mk(Some(0.42)), &policy()).contains(&RatingCode::ShellRworkElevated));
        let clean = rate(&mk(Some(0.30)), &policy());
        assert!(!clean.contains(&RatingCode::ShellRworkHigh));
        assert!(!clean.contains(&RatingCode::ShellRworkElevated));
    }

    #[test]
    fn low_nfree_downgrades_rfree_codes() {
        let mk = |rfree, nfree| ShellStatistics {
            local: Some(ShellLocalStats {
                rwork: Some(0.25),
                rfree,
                ccwork: None,
                nfree,
            }),
            ..ShellStatistics::from_deltas(Some(0.0001), Some(-0.001))
        };
        // Reliable Nfree: codes 8 / 5
        assert!(rate(&mk(Some(0.47), Some(50)), &policy()).contains(&RatingCode::ShellRfreeHigh));
        assert!(
            rate(&mk(Some(0.42), Some(50)), &policy()).contains(&RatingCode::ShellRfreeElevated)
        );
        // Low Nfree: downgraded to 4 / 3
        let codes = rate(&mk(Some(0.47), Some(30)), &policy());
        assert!(codes.contains(&RatingCode::ShellRfreeHighLowNfree));
        assert!(!codes.contains(&RatingCode::ShellRfreeHigh));
        let codes = rate(&mk(Some(0.42), Some(30)), &policy());
        assert!(codes.contains(&RatingCode::ShellRfreeElevatedLowNfree));
        // Undefined Nfree counts as low
        let codes = rate(&mk(Some(0.47), None), &policy());
        assert!(codes.contains(&RatingCode::ShellRfreeHighLowNfree));
    }

    #[test]
    fn rating_is_idempotent() {
        let stats = ShellStatistics {
            merging: Some(MergingStats {
                cc_half: Some(0.2),
                cc_star: None,
            }),
            local: Some(ShellLocalStats {
                rwork: Some(0.41),
                rfree: Some(0.46),
                ccwork: Some(0.7),
                nfree: Some(40),
            }),
            ..ShellStatistics::from_deltas(Some(0.02), Some(0.003))
        };
        assert_eq!(rate(&stats, &policy()), rate(&stats, &policy()));
    }
}
