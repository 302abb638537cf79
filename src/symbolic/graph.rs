//! symbolic::graph — hash-consed expression arena.
//!
//! Purpose
//! -------
//! Store scalar expressions over a fixed set of free symbols as a directed
//! acyclic graph. Every node lives in a single arena and is identified by a
//! [`NodeId`]; structurally identical nodes are interned once, so repeated
//! sub-expressions (survival products, covariate weights) are shared rather
//! than duplicated.
//!
//! Key behaviors
//! -------------
//! - Constructors (`add`, `mul`, `pow`, ...) fold constants and apply the
//!   neutral-element identities (`x + 0`, `x * 1`, `x ^ 1`, ...) before
//!   interning.
//! - Commutative operands are stored in a canonical order so `a + b` and
//!   `b + a` intern to the same node.
//!
//! Invariants & assumptions
//! ------------------------
//! - Operands always have a smaller id than the node that uses them. The
//!   arena is therefore topologically ordered, which `diff` and `compile`
//!   rely on to process nodes in a single ascending pass.
//! - Constants are keyed by their bit pattern with `-0.0` normalized to
//!   `0.0`; NaN constants are never produced by the model layer.
use std::collections::HashMap;

use crate::symbolic::errors::{SymbolicError, SymbolicResult};

/// Handle to a node in an [`ExprGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One expression node. Binary operands are `(left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Const(u64),
    Var(usize),
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Div(NodeId, NodeId),
    Pow(NodeId, NodeId),
    Ln(NodeId),
    Exp(NodeId),
    Neg(NodeId),
}

impl Node {
    /// Operands of this node, left first.
    pub fn operands(&self) -> [Option<NodeId>; 2] {
        match *self {
            Node::Const(_) | Node::Var(_) => [None, None],
            Node::Add(a, b) | Node::Sub(a, b) | Node::Mul(a, b) | Node::Div(a, b) | Node::Pow(a, b) => {
                [Some(a), Some(b)]
            }
            Node::Ln(a) | Node::Exp(a) | Node::Neg(a) => [Some(a), None],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExprGraph {
    nodes: Vec<Node>,
    interned: HashMap<Node, NodeId>,
    n_vars: usize,
}

impl ExprGraph {
    /// Create an empty graph over `n_vars` free symbols `x_0 .. x_{n_vars-1}`.
    pub fn new(n_vars: usize) -> Self {
        Self { nodes: Vec::new(), interned: HashMap::new(), n_vars }
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id.0]
    }

    /// Value of `id` if it is a constant node.
    pub fn as_const(&self, id: NodeId) -> Option<f64> {
        match self.nodes[id.0] {
            Node::Const(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }

    fn is_const(&self, id: NodeId, value: f64) -> bool {
        self.as_const(id) == Some(value)
    }

    fn intern(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.interned.insert(node, id);
        id
    }

    pub fn constant(&mut self, value: f64) -> NodeId {
        let value = if value == 0.0 { 0.0 } else { value };
        self.intern(Node::Const(value.to_bits()))
    }

    /// Free symbol `x_index`.
    ///
    /// # Errors
    /// [`SymbolicError::UnknownVariable`] if `index >= n_vars`.
    pub fn var(&mut self, index: usize) -> SymbolicResult<NodeId> {
        if index >= self.n_vars {
            return Err(SymbolicError::UnknownVariable { index, n_vars: self.n_vars });
        }
        Ok(self.intern(Node::Var(index)))
    }

    /// All free symbols in declaration order.
    pub fn vars(&mut self) -> Vec<NodeId> {
        (0..self.n_vars).map(|index| self.intern(Node::Var(index))).collect()
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        match (self.as_const(a), self.as_const(b)) {
            (Some(x), Some(y)) => self.constant(x + y),
            (Some(x), _) if x == 0.0 => b,
            (_, Some(y)) if y == 0.0 => a,
            _ => self.intern(Node::Add(a.min(b), a.max(b))),
        }
    }

    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == b {
            return self.constant(0.0);
        }
        match (self.as_const(a), self.as_const(b)) {
            (Some(x), Some(y)) => self.constant(x - y),
            (_, Some(y)) if y == 0.0 => a,
            (Some(x), _) if x == 0.0 => self.neg(b),
            _ => self.intern(Node::Sub(a, b)),
        }
    }

    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        match (self.as_const(a), self.as_const(b)) {
            (Some(x), Some(y)) => self.constant(x * y),
            (Some(x), _) | (_, Some(x)) if x == 0.0 => self.constant(0.0),
            (Some(x), _) if x == 1.0 => b,
            (_, Some(y)) if y == 1.0 => a,
            (Some(x), _) if x == -1.0 => self.neg(b),
            (_, Some(y)) if y == -1.0 => self.neg(a),
            _ => self.intern(Node::Mul(a.min(b), a.max(b))),
        }
    }

    pub fn div(&mut self, a: NodeId, b: NodeId) -> NodeId {
        match (self.as_const(a), self.as_const(b)) {
            (Some(x), Some(y)) if y != 0.0 => self.constant(x / y),
            (Some(x), _) if x == 0.0 => self.constant(0.0),
            (_, Some(y)) if y == 1.0 => a,
            _ => self.intern(Node::Div(a, b)),
        }
    }

    pub fn pow(&mut self, base: NodeId, exponent: NodeId) -> NodeId {
        match (self.as_const(base), self.as_const(exponent)) {
            (Some(x), Some(y)) => self.constant(x.powf(y)),
            (_, Some(y)) if y == 0.0 => self.constant(1.0),
            (_, Some(y)) if y == 1.0 => base,
            (Some(x), _) if x == 1.0 => self.constant(1.0),
            _ => self.intern(Node::Pow(base, exponent)),
        }
    }

    pub fn ln(&mut self, a: NodeId) -> NodeId {
        if let Some(x) = self.as_const(a) {
            return self.constant(x.ln());
        }
        if let Node::Exp(inner) = self.nodes[a.0] {
            return inner;
        }
        self.intern(Node::Ln(a))
    }

    pub fn exp(&mut self, a: NodeId) -> NodeId {
        if let Some(x) = self.as_const(a) {
            return self.constant(x.exp());
        }
        self.intern(Node::Exp(a))
    }

    pub fn neg(&mut self, a: NodeId) -> NodeId {
        if let Some(x) = self.as_const(a) {
            return self.constant(-x);
        }
        if let Node::Neg(inner) = self.nodes[a.0] {
            return inner;
        }
        self.intern(Node::Neg(a))
    }

    /// Nodes reachable from `roots`, in ascending (topological) order.
    pub fn reachable(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let Some(max_root) = roots.iter().max() else {
            return Vec::new();
        };
        let mut seen = vec![false; max_root.0 + 1];
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if seen[id.0] {
                continue;
            }
            seen[id.0] = true;
            for operand in self.nodes[id.0].operands().into_iter().flatten() {
                if !seen[operand.0] {
                    stack.push(operand);
                }
            }
        }
        seen.iter().enumerate().filter(|(_, s)| **s).map(|(i, _)| NodeId(i)).collect()
    }

    pub(crate) fn is_zero(&self, id: NodeId) -> bool {
        self.is_const(id, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Interning, constant folding, identities and topological reachability.
    // Derivatives and evaluation are covered in `diff` and `compile`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Commutative operands intern to a single node.
    //
    // Given
    // -----
    // - Two symbols `x`, `y`.
    //
    // Expect
    // ------
    // - `x + y` and `y + x` share an id; so do `x * y` and `y * x`.
    fn commutative_nodes_are_shared() {
        // Arrange
        let mut g = ExprGraph::new(2);
        let x = g.var(0).unwrap();
        let y = g.var(1).unwrap();

        // Act
        let xy = g.add(x, y);
        let yx = g.add(y, x);
        let mxy = g.mul(x, y);
        let myx = g.mul(y, x);

        // Assert
        assert_eq!(xy, yx);
        assert_eq!(mxy, myx);
    }

    #[test]
    // Purpose
    // -------
    // Neutral and absorbing elements collapse without creating nodes.
    //
    // Given
    // -----
    // - A symbol `x` and the constants 0 and 1.
    //
    // Expect
    // ------
    // - `x + 0 = x`, `x * 1 = x`, `x * 0 = 0`, `x ^ 1 = x`, `x ^ 0 = 1`,
    //   `x - x = 0`, `ln(exp(x)) = x`, `-(-x) = x`.
    fn identities_simplify() {
        // Arrange
        let mut g = ExprGraph::new(1);
        let x = g.var(0).unwrap();
        let zero = g.constant(0.0);
        let one = g.constant(1.0);

        // Act / Assert
        assert_eq!(g.add(x, zero), x);
        assert_eq!(g.mul(x, one), x);
        assert_eq!(g.mul(x, zero), zero);
        assert_eq!(g.pow(x, one), x);
        let p0 = g.pow(x, zero);
        assert_eq!(g.as_const(p0), Some(1.0));
        let d = g.sub(x, x);
        assert_eq!(g.as_const(d), Some(0.0));
        let e = g.exp(x);
        assert_eq!(g.ln(e), x);
        let n = g.neg(x);
        assert_eq!(g.neg(n), x);
    }

    #[test]
    // Purpose
    // -------
    // Constant sub-expressions fold to a single constant node.
    //
    // Given
    // -----
    // - `(2 + 3) * 4 ^ 0.5`.
    //
    // Expect
    // ------
    // - A constant node with value 10.
    fn constants_fold() {
        // Arrange
        let mut g = ExprGraph::new(0);
        let two = g.constant(2.0);
        let three = g.constant(3.0);
        let four = g.constant(4.0);
        let half = g.constant(0.5);

        // Act
        let s = g.add(two, three);
        let r = g.pow(four, half);
        let out = g.mul(s, r);

        // Assert
        assert_eq!(g.as_const(out), Some(10.0));
    }

    #[test]
    // Purpose
    // -------
    // Reachability returns operands before users and skips unrelated nodes.
    //
    // Given
    // -----
    // - `ln(x * y)` plus an unrelated `exp(y)`.
    //
    // Expect
    // ------
    // - Reachable set of `ln(x * y)` is `[x, y, x*y, ln]` in ascending order.
    fn reachable_is_topological() {
        // Arrange
        let mut g = ExprGraph::new(2);
        let x = g.var(0).unwrap();
        let y = g.var(1).unwrap();
        let _unrelated = g.exp(y);
        let m = g.mul(x, y);
        let l = g.ln(m);

        // Act
        let order = g.reachable(&[l]);

        // Assert
        assert_eq!(order, vec![x, y, m, l]);
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range symbols are rejected.
    //
    // Given
    // -----
    // - A graph over one symbol.
    //
    // Expect
    // ------
    // - `var(1)` returns `UnknownVariable`.
    fn var_out_of_range_errors() {
        // Arrange
        let mut g = ExprGraph::new(1);

        // Act
        let err = g.var(1).unwrap_err();

        // Assert
        assert_eq!(err, SymbolicError::UnknownVariable { index: 1, n_vars: 1 });
    }
}
