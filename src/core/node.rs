//! Compact expression nodes stored in an [`Arena`](super::Arena).
//!
//! Every node is a small tagged union. Children are referenced by dense
//! [`NodeRef`] indices rather than pointers, so a whole expression graph is a
//! single `Vec<Node>` and nodes never move once written.

use crate::functions::Func;
use std::fmt;

/// Dense index of a node inside the arena that created it.
///
/// A `NodeRef` is only meaningful for its owning arena. Resolving it against a
/// different arena is a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binary arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    /// All operations, in declaration order.
    pub const ALL: [Op; 4] = [Op::Add, Op::Sub, Op::Mul, Op::Div];

    /// Infix symbol used when rendering expressions.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        }
    }

    /// Apply the operation to two numbers.
    ///
    /// Division by zero follows IEEE semantics and yields `±inf` or `NaN`.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div => lhs / rhs,
        }
    }
}

/// A single expression node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// A numeric constant.
    Value(f64),
    /// Coordinate `i` of the input point.
    Variable(u32),
    /// `lhs <op> rhs`.
    Operation { op: Op, lhs: NodeRef, rhs: NodeRef },
    /// `func(arg)`.
    Function { func: Func, arg: NodeRef },
}

impl Node {
    /// Whether the node has children that must be evaluated first.
    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Operation { .. } | Node::Function { .. })
    }
}
