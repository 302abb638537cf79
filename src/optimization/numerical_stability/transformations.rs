//! Numerical stability utilities.
//!
//! Guarded scalar transforms between an unconstrained optimizer coordinate
//! and a probability-valued model parameter. The naïve forms
//! `1 / (1 + exp(−x))` and `ln(p / (1 − p))` overflow or lose precision in
//! the tails; the versions here branch on the sign of `x` or clamp `p` away
//! from `{0, 1}` so that `f64` arithmetic stays well conditioned.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp margin applied before taking a logit.
//! - [`safe_logistic(x)`]: ℝ → (0, 1).
//! - [`safe_logit(p)`]: (0, 1) → ℝ, inverse of `safe_logistic`.

/// Distance kept from the boundary of `(0, 1)` before taking a logit.
pub const LOGIT_EPS: f64 = 1e-12;

/// Numerically stable logistic `σ(x) = 1 / (1 + exp(−x))`.
///
/// For `x ≥ 0` the textbook form is used; for `x < 0` the algebraically
/// equivalent `exp(x) / (1 + exp(x))` avoids `exp(−x)` overflowing.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`safe_logistic`], `ln(p / (1 − p))`.
///
/// `p` is clamped to `[LOGIT_EPS, 1 − LOGIT_EPS]` so boundary guesses map to
/// large but finite coordinates.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    p.ln() - (-p).ln_1p()
}
