//! symbolic::real — one formula, two representations.
//!
//! Hazard laws, covariate weights and the log-likelihood are written once,
//! generically over [`Real`]. Instantiated with `f64` they evaluate
//! numerically; instantiated with [`Sym`] the same code records an
//! expression into an [`ExprGraph`] that can then be differentiated and
//! compiled. The two representations cannot drift apart because there is
//! only one source formula.
use std::{
    cell::RefCell,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

use crate::symbolic::graph::{ExprGraph, NodeId};

/// Scalar field the model formulas are generic over.
pub trait Real:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Constant `value` in the same representation as `self`.
    fn lift(self, value: f64) -> Self;
    fn powf(self, exponent: f64) -> Self;
    fn pow(self, exponent: Self) -> Self;
    fn ln(self) -> Self;
    fn exp(self) -> Self;
}

impl Real for f64 {
    fn lift(self, value: f64) -> Self {
        value
    }

    fn powf(self, exponent: f64) -> Self {
        f64::powf(self, exponent)
    }

    fn pow(self, exponent: Self) -> Self {
        f64::powf(self, exponent)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }
}

/// Symbolic scalar: a node id plus the graph it lives in.
///
/// Operands combined through the arithmetic operators must come from the
/// same graph.
#[derive(Clone, Copy)]
pub struct Sym<'g> {
    graph: &'g RefCell<ExprGraph>,
    id: NodeId,
}

impl<'g> Sym<'g> {
    pub fn new(graph: &'g RefCell<ExprGraph>, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The free symbols of `graph`, in declaration order.
    pub fn symbols(graph: &'g RefCell<ExprGraph>) -> Vec<Self> {
        let ids = graph.borrow_mut().vars();
        ids.into_iter().map(|id| Self::new(graph, id)).collect()
    }

    pub fn id(self) -> NodeId {
        self.id
    }

    fn unary(self, op: impl FnOnce(&mut ExprGraph, NodeId) -> NodeId) -> Self {
        let mut graph = self.graph.borrow_mut();
        let id = op(&mut *graph, self.id);
        Self { graph: self.graph, id }
    }

    fn binary(self, rhs: Self, op: impl FnOnce(&mut ExprGraph, NodeId, NodeId) -> NodeId) -> Self {
        debug_assert!(std::ptr::eq(self.graph, rhs.graph), "operands from different graphs");
        let mut graph = self.graph.borrow_mut();
        let id = op(&mut *graph, self.id, rhs.id);
        Self { graph: self.graph, id }
    }
}

impl fmt::Debug for Sym<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sym").field(&self.id).finish()
    }
}

impl Add for Sym<'_> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.binary(rhs, ExprGraph::add)
    }
}

impl Sub for Sym<'_> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.binary(rhs, ExprGraph::sub)
    }
}

impl Mul for Sym<'_> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.binary(rhs, ExprGraph::mul)
    }
}

impl Div for Sym<'_> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self.binary(rhs, ExprGraph::div)
    }
}

impl Neg for Sym<'_> {
    type Output = Self;
    fn neg(self) -> Self {
        self.unary(ExprGraph::neg)
    }
}

impl Real for Sym<'_> {
    fn lift(self, value: f64) -> Self {
        self.unary(|g, _| g.constant(value))
    }

    fn powf(self, exponent: f64) -> Self {
        let e = self.lift(exponent);
        self.pow(e)
    }

    fn pow(self, exponent: Self) -> Self {
        self.binary(exponent, ExprGraph::pow)
    }

    fn ln(self) -> Self {
        self.unary(ExprGraph::ln)
    }

    fn exp(self) -> Self {
        self.unary(ExprGraph::exp)
    }
}
