//! Recorded scalar values.
//!
//! A [`Sym`] is what a generic objective sees in place of `f64` while it is
//! being recorded: every arithmetic operator and elementary function appends a
//! node to the arena instead of computing a number.

use super::arena::Arena;
use super::node::{NodeRef, Op};
use crate::functions::Func;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A node reference bound to the arena that owns it.
#[derive(Clone)]
pub struct Sym {
    arena: Arena,
    node: NodeRef,
    generation: u32,
}

impl Sym {
    pub(crate) fn new(arena: Arena, node: NodeRef, generation: u32) -> Self {
        Self {
            arena,
            node,
            generation,
        }
    }

    /// Index of the node this value was recorded as.
    #[inline]
    pub fn node(&self) -> NodeRef {
        self.node
    }

    /// The arena this value lives in.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Evaluate the recorded expression at `x`.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.check_live();
        self.arena.evaluate(self.node, x)
    }

    /// Record the partial derivative with respect to variable `var`.
    pub fn differentiate(&self, var: usize) -> Sym {
        self.check_live();
        let node = self.arena.differentiate(self.node, var);
        self.arena.wrap(node)
    }

    pub fn sqr(&self) -> Sym {
        self.unary(Func::Sqr)
    }

    pub fn sqrt(&self) -> Sym {
        self.unary(Func::Sqrt)
    }

    pub fn exp(&self) -> Sym {
        self.unary(Func::Exp)
    }

    /// Natural logarithm.
    pub fn log(&self) -> Sym {
        self.unary(Func::Log)
    }

    pub fn sin(&self) -> Sym {
        self.unary(Func::Sin)
    }

    pub fn cos(&self) -> Sym {
        self.unary(Func::Cos)
    }

    pub fn tan(&self) -> Sym {
        self.unary(Func::Tan)
    }

    pub fn asin(&self) -> Sym {
        self.unary(Func::Asin)
    }

    pub fn acos(&self) -> Sym {
        self.unary(Func::Acos)
    }

    pub fn atan(&self) -> Sym {
        self.unary(Func::Atan)
    }

    /// Record `func(self)`.
    pub fn apply(&self, func: Func) -> Sym {
        self.unary(func)
    }

    fn unary(&self, func: Func) -> Sym {
        self.check_live();
        let node = self.arena.graph_mut().func(func, self.node);
        self.arena.wrap(node)
    }

    fn binary(&self, op: Op, rhs: &Sym) -> Sym {
        assert!(
            self.arena.same_as(&rhs.arena),
            "cannot combine values recorded in different arenas"
        );
        self.check_live();
        rhs.check_live();
        let node = self.arena.graph_mut().op(op, self.node, rhs.node);
        self.arena.wrap(node)
    }

    fn binary_const(&self, op: Op, rhs: f64) -> Sym {
        self.check_live();
        let node = {
            let mut graph = self.arena.graph_mut();
            let constant = graph.value(rhs);
            graph.op(op, self.node, constant)
        };
        self.arena.wrap(node)
    }

    fn const_binary(lhs: f64, op: Op, rhs: &Sym) -> Sym {
        rhs.check_live();
        let node = {
            let mut graph = rhs.arena.graph_mut();
            let constant = graph.value(lhs);
            graph.op(op, constant, rhs.node)
        };
        rhs.arena.wrap(node)
    }

    fn check_live(&self) {
        assert_eq!(
            self.generation,
            self.arena.generation(),
            "value {} was recorded before its arena was reset",
            self.node
        );
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sym").field("node", &self.node).finish()
    }
}

/// Renders the whole expression; intended for debugging small graphs.
impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.check_live();
        f.write_str(&self.arena.render(self.node))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:expr) => {
        impl $trait<Sym> for Sym {
            type Output = Sym;
            fn $method(self, rhs: Sym) -> Sym {
                self.binary($op, &rhs)
            }
        }

        impl $trait<&Sym> for Sym {
            type Output = Sym;
            fn $method(self, rhs: &Sym) -> Sym {
                self.binary($op, rhs)
            }
        }

        impl $trait<Sym> for &Sym {
            type Output = Sym;
            fn $method(self, rhs: Sym) -> Sym {
                self.binary($op, &rhs)
            }
        }

        impl $trait<&Sym> for &Sym {
            type Output = Sym;
            fn $method(self, rhs: &Sym) -> Sym {
                self.binary($op, rhs)
            }
        }

        impl $trait<f64> for Sym {
            type Output = Sym;
            fn $method(self, rhs: f64) -> Sym {
                self.binary_const($op, rhs)
            }
        }

        impl $trait<f64> for &Sym {
            type Output = Sym;
            fn $method(self, rhs: f64) -> Sym {
                self.binary_const($op, rhs)
            }
        }

        impl $trait<Sym> for f64 {
            type Output = Sym;
            fn $method(self, rhs: Sym) -> Sym {
                Sym::const_binary(self, $op, &rhs)
            }
        }

        impl $trait<&Sym> for f64 {
            type Output = Sym;
            fn $method(self, rhs: &Sym) -> Sym {
                Sym::const_binary(self, $op, rhs)
            }
        }

        impl $assign_trait<Sym> for Sym {
            fn $assign_method(&mut self, rhs: Sym) {
                *self = self.binary($op, &rhs);
            }
        }

        impl $assign_trait<&Sym> for Sym {
            fn $assign_method(&mut self, rhs: &Sym) {
                *self = self.binary($op, rhs);
            }
        }

        impl $assign_trait<f64> for Sym {
            fn $assign_method(&mut self, rhs: f64) {
                *self = self.binary_const($op, rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, Op::Add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, Op::Sub);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, Op::Mul);
impl_binary_op!(Div, div, DivAssign, div_assign, Op::Div);

// Recorded as `-1 * x` so that the evaluator reproduces eager `-x` exactly,
// including the sign of zero.
impl Neg for Sym {
    type Output = Sym;
    fn neg(self) -> Sym {
        Sym::const_binary(-1.0, Op::Mul, &self)
    }
}

impl Neg for &Sym {
    type Output = Sym;
    fn neg(self) -> Sym {
        Sym::const_binary(-1.0, Op::Mul, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Node;

    #[test]
    fn test_mixed_constant_operands() {
        let arena = Arena::new(1);
        let x = arena.variable(0);
        let left = 2.0 - &x;
        let right = &x / 4.0;

        assert_eq!(left.evaluate(&[0.5]), 1.5);
        assert_eq!(right.evaluate(&[0.5]), 0.125);
    }

    #[test]
    fn test_compound_assignment_records_chain() {
        let arena = Arena::new(2);
        let mut acc = arena.constant(0.0);
        acc += arena.variable(0);
        acc *= 3.0;
        acc -= arena.variable(1);
        acc /= 2.0;

        assert_eq!(acc.evaluate(&[4.0, 2.0]), 5.0);
    }

    #[test]
    fn test_negation_preserves_signed_zero() {
        let arena = Arena::new(1);
        let x = arena.variable(0);
        let neg = -&x;

        assert!(matches!(
            arena.node(neg.node()),
            Node::Operation { op: Op::Mul, .. }
        ));
        let v = neg.evaluate(&[0.0]);
        assert_eq!(v.to_bits(), (-0.0_f64).to_bits());
    }

    #[test]
    #[should_panic(expected = "different arenas")]
    fn test_cross_arena_operation_panics() {
        let a = Arena::new(1);
        let b = Arena::new(1);
        let _ = a.variable(0) + b.variable(0);
    }

    #[test]
    #[should_panic(expected = "before its arena was reset")]
    fn test_stale_value_after_reset_panics() {
        let arena = Arena::new(1);
        let x = arena.variable(0);
        arena.reset();
        let _ = x.sin();
    }

    #[test]
    fn test_display_renders_expression() {
        let arena = Arena::new(2);
        let x = arena.variable(0);
        let y = arena.variable(1);
        let f = (&x + &y).sin() * 2.0;
        assert_eq!(f.to_string(), "(sin((x[0]+x[1]))*2)");
    }
}
