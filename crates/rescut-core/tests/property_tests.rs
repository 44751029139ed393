//! # Property-Based Tests
//!
//! Verification tests using proptest for the rating and decision engines.
//!
//! These tests ensure determinism and the structural invariants of the two
//! acceptance tracks.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use rescut_core::{
    CutoffPolicy, RgapRow, Severity, ShellStatistics, Shells, decide, rate,
};
use std::collections::BTreeSet;

/// A strictly decreasing shell boundary sequence with `n + 1` boundaries.
fn arb_shells(n: usize) -> impl Strategy<Value = Shells> {
    vec(0.05f64..0.5, n).prop_map(|steps| {
        let mut limit = 10.0;
        let mut boundaries = vec![limit];
        for step in steps {
            limit -= step;
            boundaries.push(limit);
        }
        Shells::new(boundaries).expect("strictly decreasing by construction")
    })
}

/// Overall R-value deltas for one shell transition; cells may be undefined.
fn arb_stats() -> impl Strategy<Value = ShellStatistics> {
    (
        option::weighted(0.9, -0.02f64..0.02),
        option::weighted(0.9, -0.005f64..0.005),
    )
        .prop_map(|(rwork_delta, rfree_delta)| {
            ShellStatistics::from_deltas(rwork_delta, rfree_delta)
        })
}

/// A full run's worth of inputs: shells, per-transition statistics, and an
/// Rgap table row per boundary.
fn arb_run() -> impl Strategy<Value = (Shells, Vec<ShellStatistics>, Vec<RgapRow>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            arb_shells(n),
            vec(arb_stats(), n),
            vec(
                (
                    option::weighted(0.95, 0.1f64..0.3),
                    option::weighted(0.95, 0.15f64..0.35),
                ),
                n + 1,
            )
                .prop_map(|cells| {
                    cells
                        .into_iter()
                        .map(|(rwork, rfree)| RgapRow {
                            resolution: None,
                            rwork,
                            rfree,
                            gap: None,
                        })
                        .collect()
                }),
        )
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The strict track is always a prefix of accepted shells followed only
    /// by rejected ones.
    #[test]
    fn strict_track_is_a_prefix((shells, stats, rgap) in arb_run()) {
        let policy = CutoffPolicy::default();
        let ratings: Vec<BTreeSet<_>> =
            stats.iter().map(|s| rate(s, &policy)).collect();
        let decision = decide(&shells, &ratings, &rgap, &policy);

        let mut seen_rejection = false;
        for verdict in &decision.verdicts {
            if seen_rejection {
                prop_assert!(!verdict.accepted_strict);
            }
            if !verdict.accepted_strict {
                seen_rejection = true;
            }
        }
    }

    /// The strict cutoff is exactly the boundary reached by the accepted
    /// prefix, and always one of the shell boundaries.
    #[test]
    fn strict_cutoff_matches_accepted_prefix((shells, stats, rgap) in arb_run()) {
        let policy = CutoffPolicy::default();
        let ratings: Vec<BTreeSet<_>> =
            stats.iter().map(|s| rate(s, &policy)).collect();
        let decision = decide(&shells, &ratings, &rgap, &policy);

        let accepted = decision
            .verdicts
            .iter()
            .take_while(|v| v.accepted_strict)
            .count();
        prop_assert_eq!(decision.cutoff_strict, shells.boundary(accepted));
        prop_assert!(shells.as_slice().contains(&decision.cutoff_benevolent));
    }

    /// Every shell the strict track accepts, the benevolent track accepts
    /// too, so the benevolent cutoff never sits at poorer resolution.
    #[test]
    fn benevolent_never_stricter((shells, stats, rgap) in arb_run()) {
        let policy = CutoffPolicy::default();
        let ratings: Vec<BTreeSet<_>> =
            stats.iter().map(|s| rate(s, &policy)).collect();
        let decision = decide(&shells, &ratings, &rgap, &policy);

        for verdict in &decision.verdicts {
            if verdict.accepted_strict {
                prop_assert!(verdict.accepted_benevolent);
            }
        }
        prop_assert!(decision.cutoff_benevolent <= decision.cutoff_strict);
    }

    /// A shell whose worst rating sits in the worst severity tier is
    /// rejected on both tracks.
    #[test]
    fn worst_tier_rejects_on_both_tracks((shells, stats, rgap) in arb_run()) {
        let policy = CutoffPolicy::default();
        let ratings: Vec<BTreeSet<_>> =
            stats.iter().map(|s| rate(s, &policy)).collect();
        let decision = decide(&shells, &ratings, &rgap, &policy);

        for (rating, verdict) in ratings.iter().zip(&decision.verdicts) {
            if rating.iter().any(|code| code.severity() == Severity::Worst) {
                prop_assert!(!verdict.accepted_strict);
                prop_assert!(!verdict.accepted_benevolent);
            }
        }
    }

    /// Identical inputs produce identical decisions.
    #[test]
    fn decision_is_deterministic((shells, stats, rgap) in arb_run()) {
        let policy = CutoffPolicy::default();
        let ratings: Vec<BTreeSet<_>> =
            stats.iter().map(|s| rate(s, &policy)).collect();
        let first = decide(&shells, &ratings, &rgap, &policy);
        let second = decide(&shells, &ratings, &rgap, &policy);
        prop_assert_eq!(first, second);
    }

    /// Rating assigns exactly one code of the mutually exclusive
    /// overall-delta group.
    #[test]
    fn overall_group_yields_exactly_one_code(stats in arb_stats()) {
        let policy = CutoffPolicy::default();
        let rating = rate(&stats, &policy);
        let overall = [1u8, 2, 7, 12];
        let hits = rating
            .iter()
            .filter(|code| overall.contains(&code.code()))
            .count();
        prop_assert_eq!(hits, 1);
    }
}
