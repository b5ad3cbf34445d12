//! Symbolic gradient descent
//!
//! Write an objective once, record it into an expression graph, derive its
//! gradient symbolically and minimize it.
//!
//! # Features
//! - One objective definition runs on plain `f64` points or records a graph
//! - Arena-backed expression DAG with shared subexpressions
//! - Iterative (stack-safe) evaluation and memoized differentiation
//! - Finite-difference gradients for cross-checking
//! - Gradient descent, backtracking gradient descent and Polak–Ribière
//!   conjugate gradient
//!
//! # Usage Examples
//!
//! ## Recording and differentiating
//! ```
//! use symdescent::SymbolicInput;
//!
//! let x = SymbolicInput::new(2);
//! let f = x.variable(0) * x.variable(1).sin();
//! assert_eq!(f.to_string(), "(x[0]*sin(x[1]))");
//!
//! let df_dx0 = f.differentiate(0);
//! assert_eq!(df_dx0.evaluate(&[3.0, 0.5]), 0.5_f64.sin());
//! ```
//!
//! ## Minimizing
//! ```
//! use symdescent::{ConjugateGradient, Input, Objective, Optimizer};
//!
//! struct Bowl;
//!
//! impl Objective for Bowl {
//!     fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
//!         x.at(0) * x.at(0) + x.at(1) * x.at(1)
//!     }
//! }
//!
//! let result = ConjugateGradient::new().optimize(&Bowl, &[10.0, 10.0]).unwrap();
//! assert!(result.point.iter().all(|c| c.abs() < 1e-6));
//! ```

mod core;
mod diff;
mod error;
mod evaluator;
pub mod functions;
pub mod optimize;
pub mod oracle;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use crate::core::{Arena, Node, NodeRef, Op, Sym, SymbolicInput};
pub use error::OptimizeError;
pub use evaluator::{Evaluator, ReuseCache};
pub use functions::Func;
pub use optimize::{
    BacktrackingGradientDescent, ConjugateGradient, EarlyStopping, GradientDescent, LogSink,
    OptimizationDirection, OptimizationResult, Optimizer, OptimizerParameters, StopReason,
    ValueAndPoint,
};
pub use oracle::{
    APPROXIMATE_DERIVATIVE_EPS, ApproximateGradient, Oracle, SymbolicFunction, SymbolicGradient,
    SymbolicOracle, ValueAndGradient, approximate_derivative, approximate_gradient,
};
pub use traits::{Input, Objective, Scalar};
