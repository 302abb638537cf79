//! Single initial guess `θ₀ = [b, β_1..β_k]` taken from a spec's ranges.
use ndarray::Array1;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    estimation::options::InitStrategy,
    models::{HazardModel, ParamRange},
    optimization::loglik_optimizer::Theta,
};

/// Draw the starting point for a fit with `n_cov` covariates.
///
/// Ranges are assumed validated. A degenerate range (`lo == hi`) yields
/// its single value under either strategy.
pub fn initial_guess<M: HazardModel>(model: &M, n_cov: usize, strategy: &InitStrategy) -> Theta {
    let ranges = model.initial_guess_range();
    match *strategy {
        InitStrategy::Midpoint => {
            let mut theta = Array1::from_elem(n_cov + 1, ranges.cox.midpoint());
            theta[0] = ranges.shape.midpoint();
            theta
        }
        InitStrategy::Seeded { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut theta = Array1::zeros(n_cov + 1);
            theta[0] = draw(&mut rng, ranges.shape);
            for beta in theta.iter_mut().skip(1) {
                *beta = draw(&mut rng, ranges.cox);
            }
            theta
        }
    }
}

fn draw(rng: &mut StdRng, range: ParamRange) -> f64 {
    if range.lo < range.hi { rng.gen_range(range.lo..=range.hi) } else { range.lo }
}
