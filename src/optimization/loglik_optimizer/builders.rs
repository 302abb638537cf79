//! loglik_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Build an L-BFGS solver for the chosen line search and apply the optional
//! gradient and cost tolerances from [`MLEOptions`]. The initial parameter
//! vector and the iteration cap are runtime concerns applied by
//! [`run_lbfgs`](super::run::run_lbfgs), so the builders stay side-effect free.
//!
//! The L-BFGS memory is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`]. Tolerances
//! argmin rejects surface as [`OptError`](crate::optimization::errors::OptError)
//! through the crate's `From<argmin::core::Error>`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply whichever of `tol_grad` / `tol_cost` is set; absent tolerances keep
/// argmin's defaults.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
