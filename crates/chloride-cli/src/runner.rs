//! Job runner: merges parameter sources, runs the tracker, writes reports.

use std::path::Path;

use anyhow::{Context, Result};

use chloride_core::convergence::{converge, ConvergenceReport};
use chloride_core::{ParameterKey, ParameterOverrides, ParameterSet, DEFAULT_PARAMETERS};
use chloride_input::{load_parameter_file, ParseOutcome};

use crate::config::JobConfig;

/// Build the parameter set for a job.
///
/// Layers, lowest first: [`DEFAULT_PARAMETERS`], the parameter file
/// (`params_file` if given, otherwise the job's `parameter_file`), then the
/// job's inline `[parameters]`. The merged set is validated.
pub fn resolve_parameters(job: &JobConfig, params_file: Option<&Path>) -> Result<ParameterSet> {
    let mut overrides = ParameterOverrides::new();

    if let Some(path) = params_file.or(job.parameter_file.as_deref()) {
        let outcome = load_parameter_file(path)
            .with_context(|| format!("Cannot load parameters from {}", path.display()))?;
        report_skipped(&outcome, path);
        log::info!(
            "Loaded {} parameter(s) from {}",
            outcome.overrides.len(),
            path.display()
        );
        overrides = overrides.merge(&outcome.overrides);
    }

    overrides = overrides.merge(&job.parameter_overrides()?);

    let params = overrides.apply_to(&DEFAULT_PARAMETERS);
    if let Err(e) = params.validate() {
        anyhow::bail!("Invalid parameters: {}", e);
    }
    Ok(params)
}

fn report_skipped(outcome: &ParseOutcome, path: &Path) {
    for skipped in &outcome.skipped {
        log::warn!(
            "{}:{}: ignoring '{}' ({:?})",
            path.display(),
            skipped.line,
            skipped.content,
            skipped.reason
        );
    }
}

/// Run the convergence tracker and print the convergence table.
pub fn run_convergence(params: &ParameterSet, max_cap: u32) -> Result<ConvergenceReport> {
    let report = converge(params, max_cap).collect_report();
    if report.points.is_empty() {
        anyhow::bail!(
            "Depth cap {} is below the minimum series depth of 3; nothing was evaluated",
            max_cap
        );
    }

    println!("{:>6} {:>8} {:>16} {:>12}", "depth", "terms", "concentration", "change");
    let mut previous: Option<f64> = None;
    for point in &report.points {
        let change = previous
            .map(|p| format!("{:.3e}", (point.concentration - p).abs()))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:6} {:8} {:16.9} {:>12}",
            point.series_depth, point.term_count, point.concentration, change
        );
        previous = Some(point.concentration);
    }

    if !report.converged {
        log::warn!(
            "Tolerance {:e} not reached by depth {}; reporting the last partial sum",
            params.tol,
            max_cap
        );
    }

    Ok(report)
}

/// Print the parameter table and final concentration.
pub fn print_summary(params: &ParameterSet, report: &ConvergenceReport) {
    println!();
    println!("Input parameters:");
    for key in ParameterKey::ALL {
        println!("  {:>4} = {}", key, params.get(key));
    }
    if let Some(cf) = report.final_concentration() {
        println!();
        println!("Final concentration (Cf): {:.6}", cf);
    }
}

/// Write the convergence table to a CSV file with a metadata header.
pub fn write_convergence_csv(
    report: &ConvergenceReport,
    params: &ParameterSet,
    path: &Path,
) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;

    writeln!(file, "# Chloride Diffusion Analysis - Convergence Report")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    for key in ParameterKey::ALL {
        writeln!(file, "# {}: {}", key, params.get(key))?;
    }
    if let Some(cf) = report.final_concentration() {
        writeln!(file, "# final_concentration: {:.9e}", cf)?;
    }
    writeln!(file, "# converged: {}", report.converged)?;
    writeln!(file, "#")?;
    writeln!(file, "series_depth,term_count,concentration")?;

    for point in &report.points {
        writeln!(
            file,
            "{},{},{:.12e}",
            point.series_depth, point.term_count, point.concentration
        )?;
    }

    log::info!("Convergence table written to: {}", path.display());
    Ok(())
}

/// Write the parameters and convergence report to a JSON file.
pub fn write_report_json(
    report: &ConvergenceReport,
    params: &ParameterSet,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let document = serde_json::json!({
        "parameters": params,
        "final_concentration": report.final_concentration(),
        "report": report,
    });
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    log::info!("Report (JSON) written to: {}", path.display());
    Ok(())
}
