//! Core types shared across the chloride diffusion workspace.
//!
//! This module defines the physical parameter snapshot consumed by the
//! series evaluator, the partial override mapping produced by parameter
//! files, and the points emitted by the convergence tracker.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a [`ParameterSet`] at an input boundary.
///
/// The evaluator itself never raises these: it trusts its caller and lets
/// degenerate inputs propagate as IEEE-754 special values.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("Parameter {key} must be finite (got {value})")]
    NonFinite { key: ParameterKey, value: f64 },

    #[error("Parameter {key} must be strictly positive (got {value})")]
    NotPositive { key: ParameterKey, value: f64 },

    #[error("Parameter {key} must not be negative (got {value})")]
    Negative { key: ParameterKey, value: f64 },

    #[error("Unknown parameter '{0}'. Valid keys: L1, L2, L3, x, y, z, Cs, Cs0, Da, t, tol")]
    UnknownKey(String),
}

/// Name of a single field of [`ParameterSet`].
///
/// The textual form is case-sensitive and matches the key names used in
/// parameter files (`L1`, `Cs0`, `tol`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterKey {
    L1,
    L2,
    L3,
    X,
    Y,
    Z,
    Cs,
    Cs0,
    Da,
    T,
    Tol,
}

impl ParameterKey {
    /// Every key, in parameter-file order.
    pub const ALL: [ParameterKey; 11] = [
        ParameterKey::L1,
        ParameterKey::L2,
        ParameterKey::L3,
        ParameterKey::X,
        ParameterKey::Y,
        ParameterKey::Z,
        ParameterKey::Cs,
        ParameterKey::Cs0,
        ParameterKey::Da,
        ParameterKey::T,
        ParameterKey::Tol,
    ];

    /// The key as it appears in parameter files.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKey::L1 => "L1",
            ParameterKey::L2 => "L2",
            ParameterKey::L3 => "L3",
            ParameterKey::X => "x",
            ParameterKey::Y => "y",
            ParameterKey::Z => "z",
            ParameterKey::Cs => "Cs",
            ParameterKey::Cs0 => "Cs0",
            ParameterKey::Da => "Da",
            ParameterKey::T => "t",
            ParameterKey::Tol => "tol",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ParameterKey {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParameterError::UnknownKey(s.to_string()))
    }
}

/// Physical and geometric inputs for one evaluation.
///
/// A `ParameterSet` is an immutable snapshot: the evaluator and tracker
/// borrow it and never keep state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Solid dimension along x.
    #[serde(rename = "L1")]
    pub l1: f64,
    /// Solid dimension along y.
    #[serde(rename = "L2")]
    pub l2: f64,
    /// Solid dimension along z.
    #[serde(rename = "L3")]
    pub l3: f64,
    /// Observation point, x coordinate.
    pub x: f64,
    /// Observation point, y coordinate.
    pub y: f64,
    /// Observation point, z coordinate.
    pub z: f64,
    /// Surface (boundary) concentration.
    #[serde(rename = "Cs")]
    pub cs: f64,
    /// Initial concentration throughout the solid.
    #[serde(rename = "Cs0")]
    pub cs0: f64,
    /// Apparent diffusion coefficient.
    #[serde(rename = "Da")]
    pub da: f64,
    /// Elapsed time.
    pub t: f64,
    /// Convergence tolerance between successive partial sums.
    pub tol: f64,
}

/// Parameters used when neither a file nor explicit overrides are supplied.
pub const DEFAULT_PARAMETERS: ParameterSet = ParameterSet {
    l1: 30.0,
    l2: 30.0,
    l3: 30.0,
    x: 15.0,
    y: 15.0,
    z: 15.0,
    cs: 0.5,
    cs0: 0.0,
    da: 0.5,
    t: 10.0,
    tol: 1e-6,
};

impl Default for ParameterSet {
    fn default() -> Self {
        DEFAULT_PARAMETERS
    }
}

impl ParameterSet {
    /// Value of a single field.
    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::L1 => self.l1,
            ParameterKey::L2 => self.l2,
            ParameterKey::L3 => self.l3,
            ParameterKey::X => self.x,
            ParameterKey::Y => self.y,
            ParameterKey::Z => self.z,
            ParameterKey::Cs => self.cs,
            ParameterKey::Cs0 => self.cs0,
            ParameterKey::Da => self.da,
            ParameterKey::T => self.t,
            ParameterKey::Tol => self.tol,
        }
    }

    /// Copy of `self` with one field replaced.
    pub fn with(mut self, key: ParameterKey, value: f64) -> Self {
        let slot = match key {
            ParameterKey::L1 => &mut self.l1,
            ParameterKey::L2 => &mut self.l2,
            ParameterKey::L3 => &mut self.l3,
            ParameterKey::X => &mut self.x,
            ParameterKey::Y => &mut self.y,
            ParameterKey::Z => &mut self.z,
            ParameterKey::Cs => &mut self.cs,
            ParameterKey::Cs0 => &mut self.cs0,
            ParameterKey::Da => &mut self.da,
            ParameterKey::T => &mut self.t,
            ParameterKey::Tol => &mut self.tol,
        };
        *slot = value;
        self
    }

    /// Check the set is physically meaningful.
    ///
    /// Requires every value to be finite, the dimensions, diffusion
    /// coefficient and tolerance to be strictly positive, and the elapsed
    /// time to be non-negative. The observation point is not checked: a
    /// point outside the solid is well-defined for the series.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for key in ParameterKey::ALL {
            let value = self.get(key);
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { key, value });
            }
        }

        for key in [
            ParameterKey::L1,
            ParameterKey::L2,
            ParameterKey::L3,
            ParameterKey::Da,
            ParameterKey::Tol,
        ] {
            let value = self.get(key);
            if value <= 0.0 {
                return Err(ParameterError::NotPositive { key, value });
            }
        }

        if self.t < 0.0 {
            return Err(ParameterError::Negative { key: ParameterKey::T, value: self.t });
        }

        Ok(())
    }
}

/// A partial assignment of parameter values.
///
/// Produced by parameter files and job configurations, then layered over an
/// existing [`ParameterSet`]: present keys replace the prior value, missing
/// keys leave it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterOverrides(BTreeMap<ParameterKey, f64>);

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value for it.
    pub fn insert(&mut self, key: ParameterKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: ParameterKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Present assignments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        self.0.iter().map(|(&key, &value)| (key, value))
    }

    /// Layer `other` on top of `self`; keys present in both take `other`'s value.
    pub fn merge(mut self, other: &ParameterOverrides) -> Self {
        for (key, value) in other.iter() {
            self.0.insert(key, value);
        }
        self
    }

    /// Apply the overrides to `base`, returning a new snapshot.
    pub fn apply_to(&self, base: &ParameterSet) -> ParameterSet {
        self.iter().fold(*base, |params, (key, value)| params.with(key, value))
    }
}

impl FromIterator<(ParameterKey, f64)> for ParameterOverrides {
    fn from_iter<I: IntoIterator<Item = (ParameterKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One partial sum recorded by the convergence tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Number of `(n, m, p)` triples summed: `((depth - 1) / 2 + 1)^3`.
    pub term_count: u64,
    /// Largest odd index used along each axis.
    pub series_depth: u32,
    /// Truncated concentration at the observation point.
    pub concentration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constant() {
        let params = ParameterSet::default();
        assert_eq!(params, DEFAULT_PARAMETERS);
        assert_eq!(params.l1, 30.0);
        assert_eq!(params.x, 15.0);
        assert_eq!(params.cs, 0.5);
        assert_eq!(params.cs0, 0.0);
        assert_eq!(params.tol, 1e-6);
    }

    #[test]
    fn test_key_round_trip_is_case_sensitive() {
        for key in ParameterKey::ALL {
            assert_eq!(key.as_str().parse::<ParameterKey>(), Ok(key));
        }
        assert!("l1".parse::<ParameterKey>().is_err());
        assert!("CS".parse::<ParameterKey>().is_err());
        assert!("X".parse::<ParameterKey>().is_err());
    }

    #[test]
    fn test_get_and_with_agree() {
        let mut params = DEFAULT_PARAMETERS;
        for (i, key) in ParameterKey::ALL.iter().enumerate() {
            params = params.with(*key, i as f64 + 0.25);
        }
        for (i, key) in ParameterKey::ALL.iter().enumerate() {
            assert_eq!(params.get(*key), i as f64 + 0.25);
        }
    }

    #[test]
    fn test_overrides_keep_missing_values() {
        let overrides: ParameterOverrides =
            [(ParameterKey::L1, 45.0), (ParameterKey::Cs, 0.8)].into_iter().collect();
        let params = overrides.apply_to(&DEFAULT_PARAMETERS);
        assert_eq!(params.l1, 45.0);
        assert_eq!(params.cs, 0.8);
        assert_eq!(params.l2, DEFAULT_PARAMETERS.l2);
        assert_eq!(params.da, DEFAULT_PARAMETERS.da);
        assert_eq!(params.tol, DEFAULT_PARAMETERS.tol);
    }

    #[test]
    fn test_empty_overrides_are_identity() {
        let params = ParameterOverrides::new().apply_to(&DEFAULT_PARAMETERS);
        assert_eq!(params, DEFAULT_PARAMETERS);
    }

    #[test]
    fn test_merge_later_wins() {
        let file: ParameterOverrides =
            [(ParameterKey::Da, 0.3), (ParameterKey::T, 5.0)].into_iter().collect();
        let job: ParameterOverrides = [(ParameterKey::Da, 0.9)].into_iter().collect();
        let merged = file.merge(&job);
        assert_eq!(merged.get(ParameterKey::Da), Some(0.9));
        assert_eq!(merged.get(ParameterKey::T), Some(5.0));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(DEFAULT_PARAMETERS.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_inputs() {
        let zero_length = DEFAULT_PARAMETERS.with(ParameterKey::L2, 0.0);
        assert_eq!(
            zero_length.validate(),
            Err(ParameterError::NotPositive { key: ParameterKey::L2, value: 0.0 })
        );

        let negative_time = DEFAULT_PARAMETERS.with(ParameterKey::T, -1.0);
        assert!(matches!(
            negative_time.validate(),
            Err(ParameterError::Negative { key: ParameterKey::T, .. })
        ));

        let nan_cs = DEFAULT_PARAMETERS.with(ParameterKey::Cs, f64::NAN);
        assert!(matches!(
            nan_cs.validate(),
            Err(ParameterError::NonFinite { key: ParameterKey::Cs, .. })
        ));
    }

    #[test]
    fn test_validate_allows_point_outside_solid() {
        let outside = DEFAULT_PARAMETERS.with(ParameterKey::X, 45.0);
        assert!(outside.validate().is_ok());
    }

    #[test]
    fn test_serde_uses_file_key_names() {
        let json = serde_json::to_value(DEFAULT_PARAMETERS).unwrap();
        assert_eq!(json["L1"], 30.0);
        assert_eq!(json["Cs0"], 0.0);
        assert_eq!(json["tol"], 1e-6);

        let parsed: ParameterSet = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, DEFAULT_PARAMETERS);
    }
}
