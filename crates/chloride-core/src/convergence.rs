//! Successive-approximation convergence of the truncated series.
//!
//! [`converge`] returns a lazy [`ConvergenceTracker`] that evaluates the
//! series at depths `3, 5, 7, ...` and stops as soon as two consecutive
//! partial sums agree to within the parameter set's tolerance, or when the
//! depth cap is reached. Each point is computed from scratch, so a consumer
//! may stop iterating at any time without cleanup.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::series::evaluate;
use crate::types::{ConvergencePoint, ParameterSet};

/// First series depth evaluated by the tracker.
pub const MIN_SERIES_DEPTH: u32 = 3;

/// Depth cap used when the caller does not supply one.
pub const DEFAULT_MAX_CAP: u32 = 31;

/// Tolerance substituted for a zero or NaN `tol`.
pub const FALLBACK_TOLERANCE: f64 = 1e-6;

/// Number of `(n, m, p)` triples summed at a given depth.
///
/// Saturates at `u64::MAX` for depths above roughly 5.2 million.
pub fn term_count(series_depth: u32) -> u64 {
    let per_axis = u64::from(series_depth.saturating_sub(1) / 2 + 1);
    per_axis.saturating_pow(3)
}

/// Tolerance the tracker compares against.
///
/// A zero or NaN `tol` cannot stop a run, so it falls back to
/// [`FALLBACK_TOLERANCE`]. Negative values are kept and never stop early.
pub fn effective_tolerance(tol: f64) -> f64 {
    if tol == 0.0 || tol.is_nan() {
        FALLBACK_TOLERANCE
    } else {
        tol
    }
}

/// Track convergence of the series for `params`, up to depth `max_cap`.
///
/// A cap below [`MIN_SERIES_DEPTH`] yields an empty sequence. The stop
/// compares against [`effective_tolerance`] of `params.tol`.
pub fn converge(params: &ParameterSet, max_cap: u32) -> ConvergenceTracker {
    ConvergenceTracker::new(*params, max_cap)
}

/// [`converge`] with [`DEFAULT_MAX_CAP`].
pub fn converge_default(params: &ParameterSet) -> ConvergenceTracker {
    converge(params, DEFAULT_MAX_CAP)
}

/// Lazy sequence of [`ConvergencePoint`]s.
///
/// Cloning a tracker that has not been advanced restarts the sequence.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    params: ParameterSet,
    tolerance: f64,
    max_cap: u32,
    next_depth: u32,
    previous: Option<f64>,
    converged: bool,
    finished: bool,
}

impl ConvergenceTracker {
    pub fn new(params: ParameterSet, max_cap: u32) -> Self {
        Self {
            tolerance: effective_tolerance(params.tol),
            params,
            max_cap,
            next_depth: MIN_SERIES_DEPTH,
            previous: None,
            converged: false,
            finished: max_cap < MIN_SERIES_DEPTH,
        }
    }

    /// Whether the tolerance stop has fired so far.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Drain the remaining points into a [`ConvergenceReport`].
    pub fn collect_report(mut self) -> ConvergenceReport {
        let points: Vec<ConvergencePoint> = self.by_ref().collect();
        ConvergenceReport {
            points,
            converged: self.converged,
        }
    }

    fn remaining_depths(&self) -> usize {
        if self.finished || self.next_depth > self.max_cap {
            0
        } else {
            ((self.max_cap - self.next_depth) / 2 + 1) as usize
        }
    }
}

impl Iterator for ConvergenceTracker {
    type Item = ConvergencePoint;

    fn next(&mut self) -> Option<ConvergencePoint> {
        if self.finished || self.next_depth > self.max_cap {
            self.finished = true;
            return None;
        }

        let depth = self.next_depth;
        let concentration = evaluate(&self.params, depth);
        let point = ConvergencePoint {
            term_count: term_count(depth),
            series_depth: depth,
            concentration,
        };

        if let Some(previous) = self.previous {
            if (concentration - previous).abs() < self.tolerance {
                self.converged = true;
                self.finished = true;
            }
        }
        self.previous = Some(concentration);

        match depth.checked_add(2) {
            Some(next) => self.next_depth = next,
            None => self.finished = true,
        }

        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_depths();
        (remaining.min(1), Some(remaining))
    }
}

impl FusedIterator for ConvergenceTracker {}

/// A fully drained convergence run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Every point produced, in increasing depth order.
    pub points: Vec<ConvergencePoint>,
    /// `true` if the run stopped on tolerance, `false` if it ran out of depth.
    pub converged: bool,
}

impl ConvergenceReport {
    /// The last point, i.e. the best available estimate.
    pub fn final_point(&self) -> Option<&ConvergencePoint> {
        self.points.last()
    }

    /// Concentration of the last point.
    pub fn final_concentration(&self) -> Option<f64> {
        self.final_point().map(|p| p.concentration)
    }

    /// Absolute change between the last two points, if there are two.
    pub fn final_change(&self) -> Option<f64> {
        match self.points.as_slice() {
            [.., before, last] => Some((last.concentration - before.concentration).abs()),
            _ => None,
        }
    }
}
