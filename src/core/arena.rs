//! Append-only node storage shared by recording, evaluation and differentiation.

use super::display;
use super::node::{Node, NodeRef, Op};
use super::sym::Sym;
use crate::diff::{self, DerivativeCache};
use crate::evaluator::{Evaluator, ReuseCache};
use crate::functions::Func;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Node storage plus the derivative tables computed over it.
///
/// Nodes are immutable once pushed, which is what keeps the derivative cache
/// valid for the whole lifetime of the graph.
pub(crate) struct Graph {
    nodes: Vec<Node>,
    dim: u32,
    /// Unique per graph for the lifetime of the process.
    id: u64,
    generation: u32,
    pub(crate) derivatives: DerivativeCache,
}

impl Graph {
    fn new(dim: u32) -> Self {
        Self {
            nodes: Vec::new(),
            dim,
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            derivatives: DerivativeCache::default(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn dim(&self) -> u32 {
        self.dim
    }

    #[inline]
    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    /// Identifies the node contents: changes with the graph and with every reset.
    #[inline]
    pub(crate) fn version(&self) -> (u64, u32) {
        (self.id, self.generation)
    }

    /// Resolve a reference. Panics on a reference this graph never produced.
    #[inline]
    pub(crate) fn get(&self, node: NodeRef) -> Node {
        match self.nodes.get(node.index()) {
            Some(n) => *n,
            None => panic!(
                "node {} does not belong to this arena ({} nodes)",
                node,
                self.nodes.len()
            ),
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeRef {
        let index = u32::try_from(self.nodes.len()).expect("arena exceeds u32::MAX nodes");
        self.nodes.push(node);
        NodeRef(index)
    }

    pub(crate) fn value(&mut self, v: f64) -> NodeRef {
        self.push(Node::Value(v))
    }

    pub(crate) fn variable(&mut self, index: usize) -> NodeRef {
        assert!(
            index < self.dim as usize,
            "variable index {} out of range for dimension {}",
            index,
            self.dim
        );
        self.push(Node::Variable(index as u32))
    }

    pub(crate) fn op(&mut self, op: Op, lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        self.push(Node::Operation { op, lhs, rhs })
    }

    pub(crate) fn func(&mut self, func: Func, arg: NodeRef) -> NodeRef {
        self.push(Node::Function { func, arg })
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.derivatives = DerivativeCache::default();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Handle to one recording session's expression graph.
///
/// Cloning the handle is cheap and shares the same storage. An arena is
/// `!Send`: independent optimisations on different threads each
/// need their own arena.
#[derive(Clone)]
pub struct Arena {
    graph: Rc<RefCell<Graph>>,
}

impl Arena {
    /// Create an empty arena for functions of `dim` variables.
    pub fn new(dim: usize) -> Self {
        let dim = u32::try_from(dim).expect("dimension exceeds u32::MAX");
        Self {
            graph: Rc::new(RefCell::new(Graph::new(dim))),
        }
    }

    /// Number of input variables expressions in this arena may reference.
    pub fn dim(&self) -> usize {
        self.graph().dim() as usize
    }

    /// Number of nodes recorded so far.
    pub fn len(&self) -> usize {
        self.graph().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the node behind `node`.
    pub fn node(&self, node: NodeRef) -> Node {
        self.graph().get(node)
    }

    /// Record a constant.
    pub fn constant(&self, value: f64) -> Sym {
        let node = self.graph_mut().value(value);
        self.wrap(node)
    }

    /// Record a fresh reference to input coordinate `index`.
    ///
    /// # Panics
    /// If `index >= self.dim()`.
    pub fn variable(&self, index: usize) -> Sym {
        let node = self.graph_mut().variable(index);
        self.wrap(node)
    }

    /// Wrap an existing node of this arena as a recordable value.
    pub fn sym(&self, node: NodeRef) -> Sym {
        // Resolving validates the reference.
        self.graph().get(node);
        self.wrap(node)
    }

    /// Evaluate the expression rooted at `root` at the point `x`.
    pub fn evaluate(&self, root: NodeRef, x: &[f64]) -> f64 {
        Evaluator::new().evaluate(self, root, x, ReuseCache::Invalidate)
    }

    /// Record the partial derivative of `root` with respect to variable `var`.
    ///
    /// Results are memoized per `(var, node)`: asking twice returns the same
    /// reference and records nothing new.
    pub fn differentiate(&self, root: NodeRef, var: usize) -> NodeRef {
        let mut graph = self.graph_mut();
        diff::differentiate(&mut graph, root, var)
    }

    /// Human-readable form of the expression rooted at `root`.
    pub fn render(&self, root: NodeRef) -> String {
        display::render(&self.graph(), root)
    }

    /// Drop every node and derivative table.
    ///
    /// Values recorded before the reset are invalidated; using one afterwards
    /// panics.
    pub fn reset(&self) {
        self.graph_mut().reset();
    }

    /// Whether both handles share the same storage.
    pub fn same_as(&self, other: &Arena) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    pub(crate) fn generation(&self) -> u32 {
        self.graph().generation()
    }

    pub(crate) fn wrap(&self, node: NodeRef) -> Sym {
        let generation = self.generation();
        Sym::new(self.clone(), node, generation)
    }

    pub(crate) fn graph(&self) -> Ref<'_, Graph> {
        self.graph.borrow()
    }

    pub(crate) fn graph_mut(&self) -> RefMut<'_, Graph> {
        self.graph.borrow_mut()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.graph();
        f.debug_struct("Arena")
            .field("dim", &graph.dim())
            .field("nodes", &graph.len())
            .field("generation", &graph.generation())
            .finish()
    }
}
