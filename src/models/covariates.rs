//! models::covariates — proportional-hazards covariate weighting.
//!
//! For interval covariates `x_i` and weights `β` the weight is
//! `g_i = exp(Σ_k β_k · x_ik)`. It enters the hazard as an exponent on the
//! per-interval survival factor:
//!
//! - survival factor `(1 − h_i)^(g_i)`,
//! - detection probability `p_i = 1 − (1 − h_i)^(g_i)`.
//!
//! With no covariates the weight is absent (`None`) rather than `exp(0)`,
//! so the adjusted hazard is exactly the baseline hazard.
use ndarray::ArrayView1;

use crate::symbolic::Real;

/// `exp(Σ β_k x_k)`, or `None` when there are no covariates.
///
/// `betas` and `row` must have the same length.
pub fn covariate_weight<T: Real>(betas: &[T], row: ArrayView1<'_, f64>) -> Option<T> {
    debug_assert_eq!(betas.len(), row.len());
    let (first, rest) = betas.split_first()?;
    let mut linear = *first * first.lift(row[0]);
    for (beta, &x) in rest.iter().zip(row.iter().skip(1)) {
        linear = linear + *beta * beta.lift(x);
    }
    Some(linear.exp())
}

/// Probability a remaining fault is detected in the interval.
pub fn detection_probability<T: Real>(hazard: T, weight: Option<T>) -> T {
    match weight {
        None => hazard,
        Some(g) => {
            let one = hazard.lift(1.0);
            one - (one - hazard).pow(g)
        }
    }
}

/// Probability a remaining fault survives the interval undetected.
pub fn survival_factor<T: Real>(hazard: T, weight: Option<T>) -> T {
    let one = hazard.lift(1.0);
    match weight {
        None => one - hazard,
        Some(g) => (one - hazard).pow(g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hazard::{HazardModel, ModelKind};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Neutral behavior without covariates, the exp-linear weight, and the
    // complementarity of detection and survival.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Without covariates the adjusted hazard equals the baseline exactly.
    //
    // Given
    // -----
    // - Every variant, b in the default range midpoint, intervals 1..=25,
    //   an empty weight vector and an empty covariate row.
    //
    // Expect
    // ------
    // - `detection_probability(h, weight) == h` bit for bit.
    fn zero_covariates_leave_baseline_hazard_unchanged() {
        // Arrange
        let empty = ndarray::Array1::<f64>::zeros(0);

        for kind in ModelKind::ALL {
            let b = kind.default_shape_range().midpoint();
            for i in 1..=25 {
                // Act
                let h = kind.hazard(i, b);
                let weight = covariate_weight::<f64>(&[], empty.view());
                let p = detection_probability(h, weight);

                // Assert
                assert!(weight.is_none());
                assert_eq!(p.to_bits(), h.to_bits(), "{kind:?} interval {i}");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The weight is the exponential of the covariate linear predictor.
    //
    // Given
    // -----
    // - β = [0.2, −0.1], x = [3, 4].
    //
    // Expect
    // ------
    // - g = exp(0.6 − 0.4) = exp(0.2).
    fn weight_is_exp_of_linear_predictor() {
        // Arrange
        let x = array![3.0, 4.0];

        // Act
        let g = covariate_weight(&[0.2, -0.1], x.view()).unwrap();

        // Assert
        assert_relative_eq!(g, 0.2_f64.exp(), epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Detection and survival partition the remaining-fault probability.
    //
    // Given
    // -----
    // - h = 0.3 with weight exp(0.5).
    //
    // Expect
    // ------
    // - p + s = 1 and s = 0.7^exp(0.5).
    fn detection_and_survival_are_complementary() {
        // Arrange
        let h = 0.3_f64;
        let g = Some(0.5_f64.exp());

        // Act
        let p = detection_probability(h, g);
        let s = survival_factor(h, g);

        // Assert
        assert_relative_eq!(p + s, 1.0, epsilon = 1e-14);
        assert_relative_eq!(s, 0.7_f64.powf(0.5_f64.exp()), epsilon = 1e-14);
    }
}
