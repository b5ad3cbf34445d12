//! Elementary functions: evaluation and symbolic differentiation rules.
//!
//! # Derivative References
//!
//! Standard calculus, applied node-locally given the already recorded
//! derivative `dx` of the argument `x`:
//! - `sqr(x)'  = 2 * x * dx`
//! - `sqrt(x)' = dx / (2 * sqrt(x))`, reusing the `sqrt(x)` node itself
//! - `exp(x)'  = exp(x) * dx`, reusing the `exp(x)` node itself
//! - `log(x)'  = dx / x`
//! - `sin(x)'  = dx * cos(x)`, `cos(x)' = -dx * sin(x)`, `tan(x)' = dx / cos(x)^2`
//! - `asin(x)' = dx / sqrt(1 - x^2)`, `acos(x)' = -dx / sqrt(1 - x^2)`
//! - `atan(x)' = dx / (x^2 + 1)`

use crate::core::{Graph, NodeRef, Op};
use num_traits::Float;
use std::fmt;

/// Supported single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Sqr,
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl Func {
    /// All functions, in declaration order.
    pub const ALL: [Func; 10] = [
        Func::Sqr,
        Func::Sqrt,
        Func::Exp,
        Func::Log,
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Asin,
        Func::Acos,
        Func::Atan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Func::Sqr => "sqr",
            Func::Sqrt => "sqrt",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
        }
    }

    /// Evaluate the function on a number.
    ///
    /// Both eager evaluation and the graph evaluator go through this method, so
    /// recorded expressions reproduce eager results bit for bit. Arguments
    /// outside the real domain produce `NaN`, never an error.
    #[inline]
    pub fn apply<T: Float>(self, x: T) -> T {
        match self {
            Func::Sqr => x * x,
            Func::Sqrt => x.sqrt(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Asin => x.asin(),
            Func::Acos => x.acos(),
            Func::Atan => x.atan(),
        }
    }

    /// Record the derivative of `node = self(x)` given `dx`, returning the new root.
    pub(crate) fn derivative(self, g: &mut Graph, node: NodeRef, x: NodeRef, dx: NodeRef) -> NodeRef {
        match self {
            Func::Sqr => {
                let two = g.value(2.0);
                let two_x = g.op(Op::Mul, two, x);
                g.op(Op::Mul, two_x, dx)
            }
            Func::Sqrt => {
                let twice = g.op(Op::Add, node, node);
                g.op(Op::Div, dx, twice)
            }
            Func::Exp => g.op(Op::Mul, node, dx),
            Func::Log => g.op(Op::Div, dx, x),
            Func::Sin => {
                let cos = g.func(Func::Cos, x);
                g.op(Op::Mul, dx, cos)
            }
            Func::Cos => {
                let minus_one = g.value(-1.0);
                let neg_dx = g.op(Op::Mul, minus_one, dx);
                let sin = g.func(Func::Sin, x);
                g.op(Op::Mul, neg_dx, sin)
            }
            Func::Tan => {
                let cos = g.func(Func::Cos, x);
                let cos_squared = g.op(Op::Mul, cos, cos);
                g.op(Op::Div, dx, cos_squared)
            }
            Func::Asin => {
                let root = one_minus_square_root(g, x);
                g.op(Op::Div, dx, root)
            }
            Func::Acos => {
                let minus_one = g.value(-1.0);
                let neg_dx = g.op(Op::Mul, minus_one, dx);
                let root = one_minus_square_root(g, x);
                g.op(Op::Div, neg_dx, root)
            }
            Func::Atan => {
                let square = g.op(Op::Mul, x, x);
                let one = g.value(1.0);
                let denominator = g.op(Op::Add, square, one);
                g.op(Op::Div, dx, denominator)
            }
        }
    }
}

/// `sqrt(1 - x*x)`, shared by the inverse sine and cosine rules.
fn one_minus_square_root(g: &mut Graph, x: NodeRef) -> NodeRef {
    let one = g.value(1.0);
    let square = g.op(Op::Mul, x, x);
    let difference = g.op(Op::Sub, one, square);
    g.func(Func::Sqrt, difference)
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
