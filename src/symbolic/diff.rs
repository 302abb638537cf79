//! symbolic::diff — structural differentiation over an [`ExprGraph`].
//!
//! Derivatives are built as new nodes in the same graph. Because the arena
//! is topologically ordered, a single ascending pass over the nodes
//! reachable from the root sees every operand's derivative before the node
//! that uses it, so no recursion is needed and shared sub-expressions are
//! differentiated once.
//!
//! Power rule selection:
//! - exponent independent of the variable: `b · a^(b-1) · a'`
//! - base independent of the variable: `a^b · ln(a) · b'`
//! - otherwise: `a^b · (b' · ln(a) + b · a' / a)`
use crate::symbolic::{
    errors::{SymbolicError, SymbolicResult},
    graph::{ExprGraph, Node, NodeId},
};

/// `d root / d x_var`.
///
/// # Errors
/// [`SymbolicError::UnknownVariable`] if `var` is not a free symbol of the graph.
pub fn derivative(graph: &mut ExprGraph, root: NodeId, var: usize) -> SymbolicResult<NodeId> {
    if var >= graph.n_vars() {
        return Err(SymbolicError::UnknownVariable { index: var, n_vars: graph.n_vars() });
    }
    let order = graph.reachable(&[root]);
    let zero = graph.constant(0.0);
    let one = graph.constant(1.0);
    let mut memo = vec![zero; root.index() + 1];

    for id in order {
        let d = match graph.node(id) {
            Node::Const(_) => zero,
            Node::Var(j) => {
                if j == var {
                    one
                } else {
                    zero
                }
            }
            Node::Add(a, b) => graph.add(memo[a.index()], memo[b.index()]),
            Node::Sub(a, b) => graph.sub(memo[a.index()], memo[b.index()]),
            Node::Mul(a, b) => {
                let left = graph.mul(memo[a.index()], b);
                let right = graph.mul(a, memo[b.index()]);
                graph.add(left, right)
            }
            Node::Div(a, b) => {
                let (da, db) = (memo[a.index()], memo[b.index()]);
                let left = graph.div(da, b);
                if graph.is_zero(db) {
                    left
                } else {
                    let num = graph.mul(id, db);
                    let right = graph.div(num, b);
                    graph.sub(left, right)
                }
            }
            Node::Pow(a, b) => power_rule(graph, id, a, b, memo[a.index()], memo[b.index()]),
            Node::Ln(a) => graph.div(memo[a.index()], a),
            Node::Exp(a) => graph.mul(id, memo[a.index()]),
            Node::Neg(a) => graph.neg(memo[a.index()]),
        };
        memo[id.index()] = d;
    }
    Ok(memo[root.index()])
}

/// Derivative of `root` with respect to every free symbol, in order.
pub fn gradient(graph: &mut ExprGraph, root: NodeId) -> SymbolicResult<Vec<NodeId>> {
    (0..graph.n_vars()).map(|var| derivative(graph, root, var)).collect()
}

fn power_rule(
    graph: &mut ExprGraph, id: NodeId, a: NodeId, b: NodeId, da: NodeId, db: NodeId,
) -> NodeId {
    match (graph.is_zero(da), graph.is_zero(db)) {
        (true, true) => graph.constant(0.0),
        (false, true) => {
            let one = graph.constant(1.0);
            let reduced = graph.sub(b, one);
            let lowered = graph.pow(a, reduced);
            let scaled = graph.mul(b, lowered);
            graph.mul(scaled, da)
        }
        (true, false) => {
            let ln_a = graph.ln(a);
            let scaled = graph.mul(id, ln_a);
            graph.mul(scaled, db)
        }
        (false, false) => {
            let ln_a = graph.ln(a);
            let exp_part = graph.mul(db, ln_a);
            let ratio = graph.div(da, a);
            let base_part = graph.mul(b, ratio);
            let inner = graph.add(exp_part, base_part);
            graph.mul(id, inner)
        }
    }
}
