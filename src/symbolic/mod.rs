//! symbolic — minimal expression engine for score equations.
//!
//! Purpose
//! -------
//! Record a scalar formula as an expression graph, differentiate it with
//! respect to every free symbol, and lower the results into a compiled
//! [`Tape`] for fast repeated evaluation. The node set is exactly what the
//! reliability models need: constants, symbols, `+ − × ÷`, powers,
//! logarithms, exponentials and negation.
//!
//! Key behaviors
//! -------------
//! - [`ExprGraph`] interns nodes and simplifies on construction.
//! - [`Real`] lets a single generic formula run either numerically (`f64`)
//!   or symbolically ([`Sym`]).
//! - [`derivative`] / [`gradient`] differentiate structurally in one
//!   ascending pass over the arena.
//! - [`Tape`] evaluates any list of roots at a point, rejecting non-finite
//!   outputs.
//!
//! Conventions
//! -----------
//! - Free symbols are indexed `0..n_vars`; the model layer puts the shape
//!   parameter `b` first and covariate weights after it.
//! - Errors are reported as [`SymbolicError`]; nothing here panics on bad
//!   numeric input.
pub mod compile;
pub mod diff;
pub mod errors;
pub mod graph;
pub mod real;

pub use self::compile::Tape;
pub use self::diff::{derivative, gradient};
pub use self::errors::{SymbolicError, SymbolicResult};
pub use self::graph::{ExprGraph, Node, NodeId};
pub use self::real::{Real, Sym};
