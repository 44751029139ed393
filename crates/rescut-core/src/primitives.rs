//! # Policy Primitives
//!
//! Fixed policy thresholds for the shell rating and cutoff decision engines.
//!
//! The defaults are compiled into the binary; a [`CutoffPolicy`] value can
//! override them per run (the CLI loads overrides from a TOML file).
//! The engines themselves never read configuration from the environment.

use serde::{Deserialize, Serialize};

/// Shell-local R-value above which a shell is considered unacceptable.
///
/// Applies to both Rwork (rating code 9) and Rfree (codes 8/4).
pub const R_HIGH: f64 = 0.45;

/// Shell-local R-value above which a shell is considered suspicious.
///
/// Applies to both Rwork (rating code 6) and Rfree (codes 5/3).
pub const R_ELEVATED: f64 = 0.40;

/// Minimum number of free reflections for a trustworthy shell Rfree.
///
/// Below this count the Rfree-based codes are downgraded (8 -> 4, 5 -> 3)
/// and a low-Nfree advisory is recorded.
pub const NFREE_RELIABLE: u64 = 50;

/// Tolerance under which an overall Rfree change counts as "did not increase".
///
/// The upstream refinement logs report R-values with two decimals; this
/// tolerance absorbs the rounding noise of that formatting. Preserved
/// exactly for compatibility with existing pipelines.
pub const RFREE_DELTA_FLAT: f64 = 0.000009;

/// Tolerance under which an overall Rfree rise is still tolerated
/// when Rwork rose as well (rating code 2).
///
/// Like [`RFREE_DELTA_FLAT`], a two-decimal rounding artifact kept exactly.
pub const RFREE_DELTA_TOLERATED: f64 = 0.000209;

/// Overall Rwork rise above which extending the resolution is harmful
/// regardless of Rfree (rating code 12).
pub const RWORK_DELTA_LIMIT: f64 = 0.01;

/// Name of the result file holding the strict-track cutoff.
///
/// This is the sole artifact consumed by downstream reporting; the name is
/// an external contract and must not change.
pub const RESULT_FILENAME: &str = "PAIREF_cutoff.txt";

/// Fixed phrase prepended to a shell's reasons when its rejection was
/// inherited from an earlier shell rather than caused by its own statistics.
pub const PROPAGATION_PHRASE: &str =
    "But statistics deteriorate in a previous resolution shell.";

// =============================================================================
// POLICY
// =============================================================================

/// Runtime policy thresholds for the rating and decision engines.
///
/// `Default` yields the compiled-in constants above. All fields are plain
/// numbers so a partial TOML table can override any subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutoffPolicy {
    /// Shell-local R-value rejection threshold (default 0.45).
    pub r_high: f64,
    /// Shell-local R-value suspicion threshold (default 0.40).
    pub r_elevated: f64,
    /// Minimum trustworthy free-reflection count (default 50).
    pub nfree_reliable: u64,
    /// Overall Rfree delta treated as "did not increase" (default 0.000009).
    pub rfree_delta_flat: f64,
    /// Overall Rfree delta tolerated alongside an Rwork rise (default 0.000209).
    pub rfree_delta_tolerated: f64,
    /// Overall Rwork delta that is harmful outright (default 0.01).
    pub rwork_delta_limit: f64,
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        Self {
            r_high: R_HIGH,
            r_elevated: R_ELEVATED,
            nfree_reliable: NFREE_RELIABLE,
            rfree_delta_flat: RFREE_DELTA_FLAT,
            rfree_delta_tolerated: RFREE_DELTA_TOLERATED,
            rwork_delta_limit: RWORK_DELTA_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_constants() {
        let policy = CutoffPolicy::default();
        assert_eq!(policy.r_high, R_HIGH);
        assert_eq!(policy.r_elevated, R_ELEVATED);
        assert_eq!(policy.nfree_reliable, NFREE_RELIABLE);
        assert_eq!(policy.rfree_delta_flat, RFREE_DELTA_FLAT);
        assert_eq!(policy.rfree_delta_tolerated, RFREE_DELTA_TOLERATED);
        assert_eq!(policy.rwork_delta_limit, RWORK_DELTA_LIMIT);
    }

    #[test]
    fn threshold_ordering() {
        // The tolerated band must contain the flat band
        assert!(RFREE_DELTA_FLAT < RFREE_DELTA_TOLERATED);
        assert!(R_ELEVATED < R_HIGH);
    }
}
