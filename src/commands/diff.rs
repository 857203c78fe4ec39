//! Diff command implementation.
//!
//! Compares two traces (or saved graph documents), prints the text diff,
//! optionally writes the JSON report and enforces a regression budget.

use super::models::DiffArgs;
use super::utils::load_graph;
use crate::diff::{diff_graphs, format_diff, TraceDiff};
use crate::output::write_diff;
use anyhow::{Context, Result};
use log::{info, warn};

/// Execute the diff command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Either input cannot be loaded
/// * The report cannot be written
/// * A regression exceeds `max_regression_pct`
pub fn execute_diff(args: &DiffArgs) -> Result<TraceDiff> {
    info!("Comparing {} -> {}", args.old.display(), args.new.display());

    let old = load_graph(&args.old).context("Failed to load old trace")?;
    let new = load_graph(&args.new).context("Failed to load new trace")?;

    let diff = diff_graphs(&old, &new);
    println!("{}", format_diff(&diff));

    if let Some(worst) = diff.worst_regression_pct() {
        info!("Worst regression: +{:.1}%", worst);
    }

    if let Some(report) = &args.output {
        write_diff(&diff, report).context("Failed to write diff report")?;
        info!("✓ Diff report written to: {}", report.display());
    }

    if let Some(limit) = args.max_regression_pct {
        check_regression_budget(&diff, limit)?;
    }

    Ok(diff)
}

/// Fail if any regression exceeds `limit` percent
///
/// Regressions without a percentage (zero baseline) never violate.
pub fn check_regression_budget(diff: &TraceDiff, limit: f64) -> Result<()> {
    match diff.worst_regression_pct() {
        Some(worst) if worst > limit => {}
        _ => return Ok(()),
    }

    let offenders: Vec<String> = diff
        .regressions()
        .into_iter()
        .filter_map(|d| match d.duration_change_pct {
            Some(pct) if pct > limit => Some(format!("{} (+{:.1}%)", d.name, pct)),
            _ => None,
        })
        .collect();

    warn!("{} node(s) regressed beyond {:.1}%", offenders.len(), limit);
    anyhow::bail!(
        "Regression budget of {:.1}% exceeded: {}",
        limit,
        offenders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffStatus, NodeDiff};

    fn regression(name: &str, pct: Option<f64>) -> NodeDiff {
        NodeDiff {
            node_id: name.to_string(),
            name: name.to_string(),
            status: DiffStatus::Changed,
            old_duration_ms: Some(100.0),
            new_duration_ms: Some(150.0),
            duration_change_ms: Some(50.0),
            duration_change_pct: pct,
        }
    }

    #[test]
    fn test_regression_budget() {
        let diff = TraceDiff {
            old_name: "a".into(),
            new_name: "b".into(),
            node_diffs: vec![regression("slow", Some(50.0)), regression("zero-base", None)],
            edge_diffs: vec![],
        };

        assert_eq!(diff.worst_regression_pct(), Some(50.0));
        assert!(check_regression_budget(&diff, 60.0).is_ok());
        assert!(check_regression_budget(&diff, 50.0).is_ok());
        let err = check_regression_budget(&diff, 10.0).unwrap_err();
        assert!(err.to_string().contains("slow (+50.0%)"));
        assert!(!err.to_string().contains("zero-base"));
    }
}
