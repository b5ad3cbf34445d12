//! Parallel multi-start optimization using Rayon
//!
//! Enable with the `parallel` feature:
//! ```toml
//! symdescent = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Every task records the objective into its own arena, so nothing recorded
//! ever crosses a thread boundary.

use crate::error::OptimizeError;
use crate::optimize::{OptimizationResult, Optimizer};
use crate::traits::Objective;
use rayon::prelude::*;

/// Run `optimizer` on `objective` once per starting point, in parallel.
///
/// Results come back in the order of `starting_points`.
///
/// # Example
/// ```
/// use symdescent::parallel::{best_result, optimize_multi_start};
/// use symdescent::{ConjugateGradient, Input, Objective};
///
/// struct Bowl;
///
/// impl Objective for Bowl {
///     fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
///         x.at(0) * x.at(0) + x.at(1) * x.at(1)
///     }
/// }
///
/// let starts = vec![vec![1.0, 2.0], vec![-3.0, 0.5]];
/// let results = optimize_multi_start(&ConjugateGradient::new(), &Bowl, &starts);
/// assert_eq!(results.len(), 2);
/// assert!(best_result(&results).unwrap().value < 1e-10);
/// ```
pub fn optimize_multi_start<Opt, F>(
    optimizer: &Opt,
    objective: &F,
    starting_points: &[Vec<f64>],
) -> Vec<Result<OptimizationResult, OptimizeError>>
where
    Opt: Optimizer + Sync,
    F: Objective + Sync + ?Sized,
{
    starting_points
        .par_iter()
        .map(|start| optimizer.optimize(objective, start))
        .collect()
}

/// The successful run with the lowest objective value.
pub fn best_result(
    results: &[Result<OptimizationResult, OptimizeError>],
) -> Option<&OptimizationResult> {
    results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .min_by(|a, b| a.value.total_cmp(&b.value))
}
