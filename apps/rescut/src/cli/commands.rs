//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use rescut_core::{
    CutoffError, CutoffPolicy, CutoffSuggestion, Diagnostics, SuggestInput, suggest_cutoff, twodec,
};
use std::path::Path;

// =============================================================================
// POLICY LOADING
// =============================================================================

/// Load the policy thresholds, applying a TOML override file when given.
///
/// The file may set any subset of the fields; unset fields keep their
/// defaults.
pub fn load_policy(path: Option<&Path>) -> Result<CutoffPolicy, CutoffError> {
    let Some(path) = path else {
        return Ok(CutoffPolicy::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| CutoffError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|e| CutoffError::InvalidPolicy {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// =============================================================================
// SUGGEST COMMAND
// =============================================================================

/// Run the cutoff suggestion and report it.
#[allow(clippy::too_many_arguments)]
pub fn cmd_suggest(
    project: &str,
    dir: &Path,
    shells: Option<Vec<f64>>,
    complete_cross_validation: bool,
    unmerged: bool,
    n_bins_low: usize,
    flag: u32,
    policy_file: Option<&Path>,
    json_mode: bool,
) -> Result<(), CutoffError> {
    let policy = load_policy(policy_file)?;

    tracing::info!(
        "Suggesting cutoff for project {} in {:?} (ccv: {}, unmerged: {})",
        project,
        dir,
        complete_cross_validation,
        unmerged
    );

    let input = SuggestInput {
        project: project.to_string(),
        workdir: dir.to_path_buf(),
        shells,
        complete_cross_validation,
        unmerged_data: unmerged,
        n_bins_low,
        flag,
        policy,
    };

    let mut diagnostics = Diagnostics::new();
    let suggestion = suggest_cutoff(&input, &mut diagnostics)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&suggestion).unwrap_or_default()
        );
    } else {
        print_report(&suggestion);
    }

    for (key, messages) in diagnostics.iter() {
        for message in messages {
            tracing::warn!("[{}] {}", key, message);
        }
    }

    Ok(())
}

/// Print the per-shell verdict table and the suggested cutoffs.
fn print_report(suggestion: &CutoffSuggestion) {
    println!("Paired Refinement Verdicts");
    println!("==========================");
    println!();
    println!("{:<16} {:>7} {:>11}  Reasons", "Shell (A)", "Strict", "Benevolent");

    for verdict in &suggestion.decision.verdicts {
        let range = format!("{}-{}", twodec(verdict.res_from), twodec(verdict.res_to));
        let mark = |accepted: bool| if accepted { "accept" } else { "REJECT" };
        let mut reasons = verdict.reasons.iter();
        println!(
            "{:<16} {:>7} {:>11}  {}",
            range,
            mark(verdict.accepted_strict),
            mark(verdict.accepted_benevolent),
            reasons.next().map_or("", String::as_str)
        );
        for reason in reasons {
            println!("{:<38}{}", "", reason);
        }
    }

    println!();
    println!(
        "Suggested cutoff:   {} A  (written to {:?})",
        twodec(suggestion.decision.cutoff_strict),
        suggestion.result_file
    );
    println!(
        "Benevolent cutoff:  {} A",
        twodec(suggestion.decision.cutoff_benevolent)
    );
}

// =============================================================================
// POLICY COMMAND
// =============================================================================

/// Print the effective policy thresholds.
pub fn cmd_policy(policy_file: Option<&Path>, json_mode: bool) -> Result<(), CutoffError> {
    let policy = load_policy(policy_file)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&policy).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Effective Policy Thresholds");
    println!("===========================");
    println!("r_high:                {}", policy.r_high);
    println!("r_elevated:            {}", policy.r_elevated);
    println!("nfree_reliable:        {}", policy.nfree_reliable);
    println!("rfree_delta_flat:      {}", policy.rfree_delta_flat);
    println!("rfree_delta_tolerated: {}", policy.rfree_delta_tolerated);
    println!("rwork_delta_limit:     {}", policy.rwork_delta_limit);

    Ok(())
}
