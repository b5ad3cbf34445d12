//! Iterative evaluation of recorded expressions.
//!
//! The graph is walked post-order with an explicit work stack: a composite
//! node is pushed back as "ready to combine" underneath its children, so it is
//! only combined once every child value is cached. Expressions built from long
//! loops are therefore evaluated without native recursion, and each node is
//! computed at most once per call.
//!
//! Numerically undefined results (division by zero, `log` of a negative
//! number, ...) propagate as IEEE `NaN`/`±inf` and are returned as-is.

use crate::core::{Arena, Graph, Node, NodeRef};

/// Whether per-node values from the previous call may be reused.
///
/// Cached values are only valid for the point they were computed at. Use
/// [`ReuseCache::Reuse`] solely when evaluating several roots of the same
/// graph at the *same* point, e.g. the components of a gradient. Reuse is
/// ignored when the previous call saw another arena, or this arena before a
/// [`reset`](Arena::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReuseCache {
    #[default]
    Invalidate,
    Reuse,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Visit {
    Expand(NodeRef),
    Combine(NodeRef),
}

/// Reusable evaluation workspace: node value cache plus the work stack.
#[derive(Debug, Default)]
pub struct Evaluator {
    values: Vec<f64>,
    computed: Vec<bool>,
    stack: Vec<Visit>,
    /// Graph version the cached values belong to.
    source: Option<(u64, u32)>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `root` at `x`.
    ///
    /// # Panics
    /// If the expression references a coordinate beyond `x.len()`, or `root`
    /// does not belong to `arena`.
    pub fn evaluate(&mut self, arena: &Arena, root: NodeRef, x: &[f64], reuse: ReuseCache) -> f64 {
        let graph = arena.graph();
        self.evaluate_graph(&graph, root, x, reuse)
    }

    pub(crate) fn evaluate_graph(
        &mut self,
        graph: &Graph,
        root: NodeRef,
        x: &[f64],
        reuse: ReuseCache,
    ) -> f64 {
        let version = graph.version();
        if reuse == ReuseCache::Invalidate || self.source != Some(version) {
            self.computed.clear();
            self.source = Some(version);
        }
        // Sized to the arena as it is now; nodes appended later get fresh slots.
        self.computed.resize(graph.len(), false);
        self.values.resize(graph.len(), 0.0);

        self.stack.clear();
        self.stack.push(Visit::Expand(root));

        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Expand(node) => {
                    if self.computed[node.index()] {
                        continue;
                    }
                    match graph.get(node) {
                        Node::Value(v) => self.store(node, v),
                        Node::Variable(i) => {
                            let i = i as usize;
                            assert!(
                                i < x.len(),
                                "expression references x[{}] but the point has {} coordinates",
                                i,
                                x.len()
                            );
                            self.store(node, x[i]);
                        }
                        Node::Operation { lhs, rhs, .. } => {
                            self.stack.push(Visit::Combine(node));
                            self.stack.push(Visit::Expand(rhs));
                            self.stack.push(Visit::Expand(lhs));
                        }
                        Node::Function { arg, .. } => {
                            self.stack.push(Visit::Combine(node));
                            self.stack.push(Visit::Expand(arg));
                        }
                    }
                }
                Visit::Combine(node) => {
                    // A shared node may be queued twice before its first combine.
                    if self.computed[node.index()] {
                        continue;
                    }
                    let value = match graph.get(node) {
                        Node::Operation { op, lhs, rhs } => {
                            op.apply(self.values[lhs.index()], self.values[rhs.index()])
                        }
                        Node::Function { func, arg } => func.apply(self.values[arg.index()]),
                        leaf => unreachable!("leaf node {:?} is never combined", leaf),
                    };
                    self.store(node, value);
                }
            }
        }

        self.values[root.index()]
    }

    #[inline]
    fn store(&mut self, node: NodeRef, value: f64) {
        self.values[node.index()] = value;
        self.computed[node.index()] = true;
    }
}
