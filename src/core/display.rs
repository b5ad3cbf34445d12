//! Text rendering of recorded expressions.
//!
//! Rendering walks the graph with an explicit stack; deep expressions built in
//! loops would overflow the call stack with a recursive printer. Shared
//! subexpressions are printed once per use, so the output follows the size of
//! the expanded tree rather than the graph.

use super::arena::Graph;
use super::node::{Node, NodeRef};
use std::fmt::Write;

enum Piece {
    Node(NodeRef),
    Text(&'static str),
}

pub(crate) fn render(graph: &Graph, root: NodeRef) -> String {
    let mut out = String::new();
    let mut stack = vec![Piece::Node(root)];

    while let Some(piece) = stack.pop() {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Node(node) => match graph.get(node) {
                Node::Value(v) => {
                    let _ = write!(out, "{}", v);
                }
                Node::Variable(i) => {
                    let _ = write!(out, "x[{}]", i);
                }
                // Pushed in reverse so they pop in reading order.
                Node::Operation { op, lhs, rhs } => {
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Node(rhs));
                    stack.push(Piece::Text(op.symbol()));
                    stack.push(Piece::Node(lhs));
                    stack.push(Piece::Text("("));
                }
                Node::Function { func, arg } => {
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Node(arg));
                    stack.push(Piece::Text("("));
                    stack.push(Piece::Text(func.name()));
                }
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::core::Arena;

    #[test]
    fn test_render_leaves() {
        let arena = Arena::new(3);
        assert_eq!(arena.variable(2).to_string(), "x[2]");
        assert_eq!(arena.constant(-1.5).to_string(), "-1.5");
    }

    #[test]
    fn test_render_nested_functions() {
        let arena = Arena::new(1);
        let x = arena.variable(0);
        let f = x.exp().log() / (1.0 - x.sqr());
        assert_eq!(f.to_string(), "(log(exp(x[0]))/(1-sqr(x[0])))");
    }

    #[test]
    fn test_render_deep_chain_without_recursion() {
        let arena = Arena::new(1);
        let mut f = arena.variable(0);
        for _ in 0..50_000 {
            f = f.sin();
        }
        let text = arena.render(f.node());
        assert!(text.starts_with("sin(sin("));
        assert!(text.ends_with(&format!("x[0]{}", ")".repeat(50_000))));
        assert_eq!(text.matches('(').count(), 50_000);
    }
}
