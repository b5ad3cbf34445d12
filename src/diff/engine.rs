//! Differentiation engine - records derivative expressions into the arena.
//!
//! Like the evaluator, the engine walks the graph with an explicit stack and a
//! "children first, then combine" protocol, so arbitrarily long chains are
//! differentiated in time linear in the arena size without recursion.
//!
//! Derivatives are memoized per `(variable, node)` in a [`DerivativeCache`].
//! Nodes never change once written, so a cached derivative stays valid for the
//! life of the arena and is shared by every later differentiation that
//! reaches the same subgraph. No algebraic simplification is attempted: each
//! rule records its textbook form.

use crate::core::{Graph, Node, NodeRef, Op};
use crate::evaluator::Visit;
use rustc_hash::FxHashMap;

/// Per-variable tables mapping a node to the node of its derivative.
#[derive(Debug, Default)]
pub(crate) struct DerivativeCache {
    /// `tables[var][node]`, `None` while not yet computed.
    tables: FxHashMap<u32, Vec<Option<NodeRef>>>,
    zero: Option<NodeRef>,
    one: Option<NodeRef>,
}

impl DerivativeCache {
    /// Number of variables differentiated against so far.
    #[cfg(test)]
    pub(crate) fn variables(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn lookup(&self, var: u32, node: NodeRef) -> Option<NodeRef> {
        self.tables
            .get(&var)
            .and_then(|table| table.get(node.index()).copied().flatten())
    }
}

/// Record `d root / d x[var]` and return its root node.
///
/// # Panics
/// If `var` is outside the arena's dimension or `root` is not one of its nodes.
pub(crate) fn differentiate(graph: &mut Graph, root: NodeRef, var: usize) -> NodeRef {
    assert!(
        var < graph.dim() as usize,
        "cannot differentiate with respect to x[{}] in a {}-dimensional arena",
        var,
        graph.dim()
    );
    let var = var as u32;
    graph.get(root);

    if let Some(known) = graph.derivatives.lookup(var, root) {
        return known;
    }

    let zero = match graph.derivatives.zero {
        Some(zero) => zero,
        None => {
            let zero = graph.value(0.0);
            graph.derivatives.zero = Some(zero);
            zero
        }
    };
    let one = match graph.derivatives.one {
        Some(one) => one,
        None => {
            let one = graph.value(1.0);
            graph.derivatives.one = Some(one);
            one
        }
    };

    // Taken out of the graph while rules append new nodes to it.
    let mut table = graph.derivatives.tables.remove(&var).unwrap_or_default();
    table.resize(graph.len(), None);

    let mut stack = vec![Visit::Expand(root)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Expand(node) => {
                if table[node.index()].is_some() {
                    continue;
                }
                match graph.get(node) {
                    Node::Variable(i) => {
                        table[node.index()] = Some(if i == var { one } else { zero });
                    }
                    Node::Value(_) => table[node.index()] = Some(zero),
                    Node::Operation { lhs, rhs, .. } => {
                        stack.push(Visit::Combine(node));
                        stack.push(Visit::Expand(rhs));
                        stack.push(Visit::Expand(lhs));
                    }
                    Node::Function { arg, .. } => {
                        stack.push(Visit::Combine(node));
                        stack.push(Visit::Expand(arg));
                    }
                }
            }
            Visit::Combine(node) => {
                if table[node.index()].is_some() {
                    continue;
                }
                let derivative = match graph.get(node) {
                    Node::Operation { op, lhs, rhs } => {
                        let da = known(&table, lhs);
                        let db = known(&table, rhs);
                        d_op(graph, op, lhs, rhs, da, db)
                    }
                    Node::Function { func, arg } => {
                        let dx = known(&table, arg);
                        func.derivative(graph, node, arg, dx)
                    }
                    leaf => unreachable!("leaf node {:?} is never combined", leaf),
                };
                table[node.index()] = Some(derivative);
            }
        }
    }

    let result = known(&table, root);
    graph.derivatives.tables.insert(var, table);
    result
}

fn known(table: &[Option<NodeRef>], node: NodeRef) -> NodeRef {
    match table[node.index()] {
        Some(d) => d,
        None => unreachable!("derivative of {} requested before it was computed", node),
    }
}

/// Record the derivative of `a <op> b` given `da` and `db`.
fn d_op(g: &mut Graph, op: Op, a: NodeRef, b: NodeRef, da: NodeRef, db: NodeRef) -> NodeRef {
    match op {
        Op::Add => g.op(Op::Add, da, db),
        Op::Sub => g.op(Op::Sub, da, db),
        // a*db + b*da
        Op::Mul => {
            let a_db = g.op(Op::Mul, a, db);
            let b_da = g.op(Op::Mul, b, da);
            g.op(Op::Add, a_db, b_da)
        }
        // (b*da - a*db) / (b*b)
        Op::Div => {
            let b_da = g.op(Op::Mul, b, da);
            let a_db = g.op(Op::Mul, a, db);
            let numerator = g.op(Op::Sub, b_da, a_db);
            let b_squared = g.op(Op::Mul, b, b);
            g.op(Op::Div, numerator, b_squared)
        }
    }
}
