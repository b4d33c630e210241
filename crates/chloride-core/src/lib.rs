//! # Chloride Core
//!
//! The numerical backbone of the chloride diffusion workspace. This crate
//! evaluates the truncated triple Fourier series for transient diffusion of
//! chloride ions into a rectangular solid, and tracks how the partial sum
//! converges as more odd harmonics are included.
//!
//! ## Architecture
//!
//! Everything here is pure and synchronous. [`series::evaluate`] is a total
//! function of a [`types::ParameterSet`] snapshot and a truncation depth;
//! [`convergence::converge`] wraps it in a lazy iterator that any
//! presentation layer can consume, stop early, or restart. Input validation
//! lives at the boundary ([`types::ParameterSet::validate`]) and is never
//! applied by the evaluator itself.
//!
//! ## Modules
//!
//! - [`types`] — Parameter snapshot, defaults, overrides, convergence points.
//! - [`series`] — The truncated triple-series evaluator.
//! - [`convergence`] — Successive-approximation convergence tracker.

pub mod convergence;
pub mod series;
pub mod types;

pub use convergence::{converge, ConvergenceReport, ConvergenceTracker, DEFAULT_MAX_CAP};
pub use series::evaluate;
pub use types::{
    ConvergencePoint, ParameterError, ParameterKey, ParameterOverrides, ParameterSet,
    DEFAULT_PARAMETERS,
};
