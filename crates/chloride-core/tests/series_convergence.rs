//! Integration tests for the series evaluator and convergence tracker.
//!
//! Reference values were produced by an independent double-precision
//! evaluation of the same triple sum.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use chloride_core::convergence::{converge, converge_default, term_count};
use chloride_core::series::evaluate;
use chloride_core::types::{ParameterKey, ParameterSet, DEFAULT_PARAMETERS};

// ─────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────

/// Default slab with the observation point moved off-centre.
fn off_centre_params() -> ParameterSet {
    ParameterSet {
        x: 4.0,
        y: 11.0,
        z: 27.5,
        ..DEFAULT_PARAMETERS
    }
}

// ─────────────────────────────────────────────────────────────
// Series evaluator
// ─────────────────────────────────────────────────────────────

#[test]
fn test_default_scenario_reference_value() {
    let value = evaluate(&DEFAULT_PARAMETERS, 15);
    assert_abs_diff_eq!(value, 6.318774228575297e-06, epsilon = 1e-9);
    // Midpoint of the slab: all sines are positive and delta_C < 0, so the
    // series pulls the value below the surface concentration.
    assert!(value < DEFAULT_PARAMETERS.cs);
}

#[test]
fn test_reference_partial_sums() {
    let expected = [
        (3, 0.07643294280353807),
        (5, -0.01646737107344942),
        (7, 0.002287853351902458),
        (9, -0.00020854615778853614),
        (11, 1.9649492245088496e-05),
        (13, 5.760287048406365e-06),
    ];
    for (depth, reference) in expected {
        assert_abs_diff_eq!(evaluate(&DEFAULT_PARAMETERS, depth), reference, epsilon = 1e-9);
    }
}

#[test]
fn test_equal_concentrations_are_exact_for_every_depth() {
    let params = ParameterSet {
        cs: 0.35,
        cs0: 0.35,
        ..off_centre_params()
    };
    for max_index in (1..=21).step_by(2) {
        assert_eq!(evaluate(&params, max_index), 0.35);
    }
}

#[test]
fn test_evaluate_is_idempotent() {
    let params = off_centre_params();
    let a = evaluate(&params, 17);
    let b = evaluate(&params, 17);
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn test_initial_condition_recovered_at_t_zero() {
    let params = DEFAULT_PARAMETERS.with(ParameterKey::T, 0.0);
    let coarse = evaluate(&params, 15);
    let fine = evaluate(&params, 101);
    // Partial sums of the step function oscillate, but the error shrinks.
    assert!((fine - params.cs0).abs() < 0.02);
    assert!((fine - params.cs0).abs() < (coarse - params.cs0).abs());
}

#[test]
fn test_long_time_approaches_surface_concentration() {
    let params = DEFAULT_PARAMETERS.with(ParameterKey::T, 1000.0);
    assert_abs_diff_eq!(evaluate(&params, 5), params.cs, epsilon = 1e-6);
}

#[test]
fn test_extreme_decay_is_clamped_not_nan() {
    let params = DEFAULT_PARAMETERS.with(ParameterKey::T, 1e12);
    let value = evaluate(&params, 7);
    assert!(value.is_finite());
    assert_abs_diff_eq!(value, params.cs, epsilon = 1e-12);
}

#[test]
fn test_symmetric_points_agree() {
    // The solution is symmetric about the slab midplanes.
    let a = ParameterSet { x: 5.0, ..DEFAULT_PARAMETERS };
    let b = ParameterSet { x: 25.0, ..DEFAULT_PARAMETERS };
    assert_relative_eq!(evaluate(&a, 11), evaluate(&b, 11), epsilon = 1e-12);
}

#[test]
fn test_zero_diffusion_coefficient_freezes_initial_series() {
    // Da = 0 is degenerate but well-defined: no decay at all.
    let frozen = DEFAULT_PARAMETERS.with(ParameterKey::Da, 0.0);
    let initial = DEFAULT_PARAMETERS.with(ParameterKey::T, 0.0);
    assert_eq!(evaluate(&frozen, 9), evaluate(&initial, 9));
}

// ─────────────────────────────────────────────────────────────
// Convergence tracker
// ─────────────────────────────────────────────────────────────

#[test]
fn test_default_run_converges_at_depth_fifteen() {
    let report = converge_default(&DEFAULT_PARAMETERS).collect_report();
    assert!(report.converged);
    assert_eq!(report.points.len(), 7);

    let last = report.final_point().unwrap();
    assert_eq!(last.series_depth, 15);
    assert_eq!(last.term_count, 512);
    assert_eq!(last.concentration, evaluate(&DEFAULT_PARAMETERS, 15));
    assert!(report.final_change().unwrap() < DEFAULT_PARAMETERS.tol);
}

#[test]
fn test_points_match_evaluator() {
    for point in converge(&off_centre_params(), 13) {
        assert_eq!(point.term_count, term_count(point.series_depth));
        assert_eq!(point.concentration, evaluate(&off_centre_params(), point.series_depth));
    }
}

#[test]
fn test_at_most_fifteen_points_for_default_cap() {
    let params = DEFAULT_PARAMETERS.with(ParameterKey::Tol, 1e-300);
    let points: Vec<_> = converge(&params, 31).collect();
    assert_eq!(points.len(), 15);
    let depths: Vec<u32> = points.iter().map(|p| p.series_depth).collect();
    assert_eq!(depths, (3..=31).step_by(2).collect::<Vec<_>>());
}

#[test]
fn test_loose_tolerance_stops_at_second_point() {
    let params = DEFAULT_PARAMETERS.with(ParameterKey::Tol, 1.0);
    let report = converge(&params, 5).collect_report();
    assert_eq!(report.points.len(), 2);
    assert!(report.converged);
    assert_eq!(report.points[1].series_depth, 5);
    assert_eq!(report.final_concentration(), Some(report.points[1].concentration));
}

#[test]
fn test_only_tolerance_or_cap_ends_the_run() {
    // No monotonicity is assumed: the run must end either because the last
    // change is within tolerance, or because the cap was reached.
    let params = off_centre_params();
    let report = converge(&params, 21).collect_report();
    let last = report.final_point().unwrap();
    if report.converged {
        assert!(report.final_change().unwrap() < params.tol);
    } else {
        assert_eq!(last.series_depth, 21);
    }
}

#[test]
fn test_consumer_may_stop_early() {
    let first_two: Vec<_> = converge(&DEFAULT_PARAMETERS, 31).take(2).collect();
    assert_eq!(first_two.len(), 2);
    assert_eq!(first_two[1].series_depth, 5);
}

#[test]
fn test_report_json_round_trip() {
    let report = converge(&DEFAULT_PARAMETERS, 7).collect_report();
    let json = serde_json::to_string(&report).unwrap();
    let parsed: chloride_core::ConvergenceReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}
