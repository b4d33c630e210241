//! Truncated triple Fourier series for diffusion in a rectangular solid.
//!
//! For a solid $[0, L_1] \times [0, L_2] \times [0, L_3]$ held at surface
//! concentration $C_s$ with uniform initial concentration $C_{s0}$, the
//! concentration at $(x, y, z)$ after time $t$ is
//!
//! $$C = C_s + \frac{64 (C_{s0} - C_s)}{\pi^3}
//!   \sum_{n,m,p\ \text{odd}} \frac{1}{nmp}
//!   \sin\frac{n\pi x}{L_1} \sin\frac{m\pi y}{L_2} \sin\frac{p\pi z}{L_3}
//!   e^{-D_a \lambda_{nmp} t}$$
//!
//! with $\lambda_{nmp} = (n\pi/L_1)^2 + (m\pi/L_2)^2 + (p\pi/L_3)^2$.
//! Even harmonics vanish for this boundary condition, so only odd indices
//! are summed.

use std::f64::consts::PI;

use crate::types::ParameterSet;

/// Lower bound applied to the decay exponent before `exp`.
pub const EXPONENT_FLOOR: f64 = -700.0;

/// Odd indices `1, 3, 5, ...` up to and including `max_index`.
///
/// An even `max_index` stops at `max_index - 1`; zero yields nothing.
pub fn odd_indices(max_index: u32) -> impl Iterator<Item = u32> + Clone {
    (1..=max_index).step_by(2)
}

/// Eigenvalue $\lambda_{nmp}$ of the Laplacian for mode `(n, m, p)`.
pub fn eigenvalue(n: u32, m: u32, p: u32, params: &ParameterSet) -> f64 {
    let kx = f64::from(n) * PI / params.l1;
    let ky = f64::from(m) * PI / params.l2;
    let kz = f64::from(p) * PI / params.l3;
    kx * kx + ky * ky + kz * kz
}

/// `exp(exponent)` with the exponent clamped at [`EXPONENT_FLOOR`].
///
/// `f64::max` returns the floor for a NaN exponent, so NaN must be
/// forwarded explicitly to keep IEEE propagation.
pub fn decay_factor(exponent: f64) -> f64 {
    if exponent.is_nan() {
        return exponent;
    }
    exponent.max(EXPONENT_FLOOR).exp()
}

/// Truncated concentration at the observation point.
///
/// Sums every odd `(n, m, p)` with each index in `1..=max_index`. The
/// evaluator trusts its input: zero dimensions or diffusion coefficient give
/// `Inf`/`NaN` rather than an error.
pub fn evaluate(params: &ParameterSet, max_index: u32) -> f64 {
    let delta_c = params.cs0 - params.cs;
    let coeff_base = 64.0 * delta_c / PI.powi(3);

    let mut sum = 0.0;
    for n in odd_indices(max_index) {
        let sin_x = (f64::from(n) * PI * params.x / params.l1).sin();
        for m in odd_indices(max_index) {
            let sin_y = (f64::from(m) * PI * params.y / params.l2).sin();
            for p in odd_indices(max_index) {
                let sin_z = (f64::from(p) * PI * params.z / params.l3).sin();

                let term_coeff = coeff_base / (f64::from(n) * f64::from(m) * f64::from(p));
                let lambda = eigenvalue(n, m, p, params);
                let decay = decay_factor(-params.da * lambda * params.t);

                sum += term_coeff * (sin_x * sin_y * sin_z) * decay;
            }
        }
    }

    params.cs + sum
}
