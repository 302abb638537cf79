//! symbolic::compile — lower expression roots to a linear evaluation tape.
//!
//! Purpose
//! -------
//! Turn one or more graph roots into a flat instruction list that can be
//! evaluated repeatedly at arbitrary points without touching the graph
//! again. Only nodes reachable from the requested roots are emitted, each
//! exactly once, so shared sub-expressions are computed a single time per
//! evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Instructions are emitted in ascending node order; every operand slot
//!   is therefore written before it is read.
//! - A [`Tape`] is immutable after compilation and holds no reference to
//!   the graph it came from.
use crate::symbolic::{
    errors::{SymbolicError, SymbolicResult},
    graph::{ExprGraph, Node, NodeId},
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Instr {
    Const(f64),
    Var(usize),
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    Pow(usize, usize),
    Ln(usize),
    Exp(usize),
    Neg(usize),
}

/// Compiled, reusable evaluator for a fixed list of expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Tape {
    instrs: Vec<Instr>,
    outputs: Vec<usize>,
    n_vars: usize,
}

impl Tape {
    /// Compile `roots` (in order) from `graph`.
    pub fn compile(graph: &ExprGraph, roots: &[NodeId]) -> Self {
        let order = graph.reachable(roots);
        let mut slot = vec![usize::MAX; order.last().map_or(0, |id| id.index() + 1)];
        let mut instrs = Vec::with_capacity(order.len());
        for id in order {
            let s = |n: NodeId| slot[n.index()];
            let instr = match graph.node(id) {
                Node::Const(bits) => Instr::Const(f64::from_bits(bits)),
                Node::Var(j) => Instr::Var(j),
                Node::Add(a, b) => Instr::Add(s(a), s(b)),
                Node::Sub(a, b) => Instr::Sub(s(a), s(b)),
                Node::Mul(a, b) => Instr::Mul(s(a), s(b)),
                Node::Div(a, b) => Instr::Div(s(a), s(b)),
                Node::Pow(a, b) => Instr::Pow(s(a), s(b)),
                Node::Ln(a) => Instr::Ln(s(a)),
                Node::Exp(a) => Instr::Exp(s(a)),
                Node::Neg(a) => Instr::Neg(s(a)),
            };
            slot[id.index()] = instrs.len();
            instrs.push(instr);
        }
        let outputs = roots.iter().map(|r| slot[r.index()]).collect();
        Self { instrs, outputs, n_vars: graph.n_vars() }
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of instructions executed per evaluation.
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Evaluate every output at `point`.
    ///
    /// # Errors
    /// - [`SymbolicError::ArityMismatch`] if `point.len() != n_vars`.
    /// - [`SymbolicError::NonFiniteEvaluation`] for the first output that is
    ///   NaN or infinite.
    pub fn evaluate(&self, point: &[f64]) -> SymbolicResult<Vec<f64>> {
        let mut scratch = Vec::with_capacity(self.instrs.len());
        let mut out = vec![0.0; self.outputs.len()];
        self.evaluate_into(point, &mut scratch, &mut out)?;
        Ok(out)
    }

    /// Allocation-free variant of [`Tape::evaluate`]; `scratch` is reused.
    pub fn evaluate_into(
        &self, point: &[f64], scratch: &mut Vec<f64>, out: &mut [f64],
    ) -> SymbolicResult<()> {
        if point.len() != self.n_vars {
            return Err(SymbolicError::ArityMismatch { expected: self.n_vars, found: point.len() });
        }
        if out.len() != self.outputs.len() {
            return Err(SymbolicError::ArityMismatch {
                expected: self.outputs.len(),
                found: out.len(),
            });
        }
        scratch.clear();
        for instr in &self.instrs {
            let v = match *instr {
                Instr::Const(c) => c,
                Instr::Var(j) => point[j],
                Instr::Add(a, b) => scratch[a] + scratch[b],
                Instr::Sub(a, b) => scratch[a] - scratch[b],
                Instr::Mul(a, b) => scratch[a] * scratch[b],
                Instr::Div(a, b) => scratch[a] / scratch[b],
                Instr::Pow(a, b) => scratch[a].powf(scratch[b]),
                Instr::Ln(a) => scratch[a].ln(),
                Instr::Exp(a) => scratch[a].exp(),
                Instr::Neg(a) => -scratch[a],
            };
            scratch.push(v);
        }
        for (output, (&s, o)) in self.outputs.iter().zip(out.iter_mut()).enumerate() {
            let value = scratch[s];
            if !value.is_finite() {
                return Err(SymbolicError::NonFiniteEvaluation { output, value });
            }
            *o = value;
        }
        Ok(())
    }
}
