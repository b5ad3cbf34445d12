//! Value and gradient oracles over raw points.
//!
//! Optimizers only ever talk to an [`Oracle`]. Two families are provided:
//! - symbolic: [`SymbolicFunction`] / [`SymbolicGradient`] evaluate a recorded
//!   expression and its recorded partial derivatives;
//! - approximate: [`ApproximateGradient`] wraps an opaque closure and estimates
//!   the gradient with central finite differences.

use crate::core::{Arena, NodeRef, Sym, SymbolicInput};
use crate::evaluator::{Evaluator, ReuseCache};
use crate::traits::Objective;

/// Step used by the central finite-difference estimates.
pub const APPROXIMATE_DERIVATIVE_EPS: f64 = 1e-4;

/// Function value and gradient at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAndGradient {
    pub value: f64,
    pub gradient: Vec<f64>,
}

/// Anything that can report a function value and gradient at a point.
///
/// Methods take `&mut self` so implementations can keep evaluation caches.
pub trait Oracle {
    /// Number of coordinates the function takes.
    fn dim(&self) -> usize;

    fn value(&mut self, point: &[f64]) -> f64;

    fn gradient(&mut self, point: &[f64]) -> Vec<f64>;

    fn value_and_gradient(&mut self, point: &[f64]) -> ValueAndGradient {
        ValueAndGradient {
            value: self.value(point),
            gradient: self.gradient(point),
        }
    }
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn value(&mut self, point: &[f64]) -> f64 {
        (**self).value(point)
    }

    fn gradient(&mut self, point: &[f64]) -> Vec<f64> {
        (**self).gradient(point)
    }

    fn value_and_gradient(&mut self, point: &[f64]) -> ValueAndGradient {
        (**self).value_and_gradient(point)
    }
}

fn check_dimension(point: &[f64], dim: usize) {
    assert_eq!(
        point.len(),
        dim,
        "point has {} coordinates, but the function takes {}",
        point.len(),
        dim
    );
}

/// A recorded expression evaluated on demand.
pub struct SymbolicFunction {
    arena: Arena,
    root: NodeRef,
    evaluator: Evaluator,
}

impl SymbolicFunction {
    /// Record `objective` against the placeholder `x`.
    ///
    /// # Panics
    /// If the objective returns a value recorded in some other arena.
    pub fn record<O: Objective + ?Sized>(objective: &O, x: &SymbolicInput) -> Self {
        let root = objective.eval(x);
        assert!(
            root.arena().same_as(x.arena()),
            "objective returned a value recorded in a different arena"
        );
        Self::from_sym(root)
    }

    /// Wrap an already recorded value.
    pub fn from_sym(sym: Sym) -> Self {
        Self {
            arena: sym.arena().clone(),
            root: sym.node(),
            evaluator: Evaluator::new(),
        }
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn dim(&self) -> usize {
        self.arena.dim()
    }

    /// Value at `point`.
    ///
    /// # Panics
    /// If `point.len() != self.dim()`.
    pub fn evaluate(&mut self, point: &[f64]) -> f64 {
        check_dimension(point, self.dim());
        self.evaluator
            .evaluate(&self.arena, self.root, point, ReuseCache::Invalidate)
    }

    /// Record the partial derivatives with respect to every coordinate.
    pub fn gradient(&self) -> SymbolicGradient {
        SymbolicGradient::new(self)
    }

    pub fn render(&self) -> String {
        self.arena.render(self.root)
    }
}

/// The recorded partial derivatives of a [`SymbolicFunction`].
pub struct SymbolicGradient {
    arena: Arena,
    root: NodeRef,
    partials: Vec<NodeRef>,
    evaluator: Evaluator,
}

impl SymbolicGradient {
    /// Differentiate `function` once per input coordinate.
    pub fn new(function: &SymbolicFunction) -> Self {
        let arena = function.arena.clone();
        let partials = (0..arena.dim())
            .map(|i| arena.differentiate(function.root, i))
            .collect();
        Self {
            arena,
            root: function.root,
            partials,
            evaluator: Evaluator::new(),
        }
    }

    /// Root node of `d f / d x[i]` for every `i`.
    pub fn partials(&self) -> &[NodeRef] {
        &self.partials
    }

    pub fn dim(&self) -> usize {
        self.partials.len()
    }

    /// Gradient at `point`.
    ///
    /// Subexpressions shared between components are computed once: the node
    /// cache is invalidated for the first component and reused for the rest,
    /// all at the same point.
    pub fn evaluate(&mut self, point: &[f64]) -> Vec<f64> {
        check_dimension(point, self.dim());
        let mut gradient = Vec::with_capacity(self.partials.len());
        for (i, &partial) in self.partials.iter().enumerate() {
            let reuse = if i == 0 {
                ReuseCache::Invalidate
            } else {
                ReuseCache::Reuse
            };
            gradient.push(self.evaluator.evaluate(&self.arena, partial, point, reuse));
        }
        gradient
    }

    /// Value and gradient at `point`, sharing one node cache.
    pub fn value_and_gradient(&mut self, point: &[f64]) -> ValueAndGradient {
        check_dimension(point, self.dim());
        let value = self
            .evaluator
            .evaluate(&self.arena, self.root, point, ReuseCache::Invalidate);
        let gradient = self
            .partials
            .iter()
            .map(|&partial| {
                self.evaluator
                    .evaluate(&self.arena, partial, point, ReuseCache::Reuse)
            })
            .collect();
        ValueAndGradient { value, gradient }
    }
}

/// Symbolic oracle: a recorded function whose gradient is recorded lazily, on
/// the first request.
pub struct SymbolicOracle {
    function: SymbolicFunction,
    gradient: Option<SymbolicGradient>,
}

impl SymbolicOracle {
    pub fn new(function: SymbolicFunction) -> Self {
        Self {
            function,
            gradient: None,
        }
    }

    /// Record `objective` in a fresh `dim`-dimensional session.
    pub fn record<O: Objective + ?Sized>(objective: &O, dim: usize) -> Self {
        let x = SymbolicInput::new(dim);
        Self::new(SymbolicFunction::record(objective, &x))
    }

    pub fn function(&self) -> &SymbolicFunction {
        &self.function
    }

    /// The recorded gradient, differentiating now if not done yet.
    pub fn symbolic_gradient(&mut self) -> &mut SymbolicGradient {
        let function = &self.function;
        self.gradient
            .get_or_insert_with(|| SymbolicGradient::new(function))
    }

    /// Nodes in the underlying arena, including any recorded derivatives.
    pub fn node_count(&self) -> usize {
        self.function.arena().len()
    }
}

impl Oracle for SymbolicOracle {
    fn dim(&self) -> usize {
        self.function.dim()
    }

    fn value(&mut self, point: &[f64]) -> f64 {
        self.function.evaluate(point)
    }

    fn gradient(&mut self, point: &[f64]) -> Vec<f64> {
        self.symbolic_gradient().evaluate(point)
    }

    fn value_and_gradient(&mut self, point: &[f64]) -> ValueAndGradient {
        self.symbolic_gradient().value_and_gradient(point)
    }
}

/// Central finite-difference estimate of `∂f/∂x_i` at `x`.
pub fn approximate_derivative<F>(f: F, x: &[f64], i: usize, eps: f64) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let mut lower = x.to_vec();
    let mut upper = x.to_vec();
    lower[i] -= eps;
    upper[i] += eps;
    (f(&upper) - f(&lower)) / (eps + eps)
}

/// Central finite-difference estimate of the full gradient: one pair of
/// evaluations per coordinate.
pub fn approximate_gradient<F>(f: F, x: &[f64], eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut shifted = x.to_vec();
    let mut gradient = Vec::with_capacity(x.len());
    for i in 0..shifted.len() {
        let original = shifted[i];
        shifted[i] = original - eps;
        let lower = f(&shifted);
        shifted[i] = original + eps;
        let upper = f(&shifted);
        shifted[i] = original;
        gradient.push((upper - lower) / (eps + eps));
    }
    gradient
}

/// Oracle for opaque functions that cannot be recorded.
pub struct ApproximateGradient<F> {
    f: F,
    dim: usize,
    eps: f64,
}

impl<F> ApproximateGradient<F>
where
    F: Fn(&[f64]) -> f64,
{
    pub fn new(f: F, dim: usize) -> Self {
        Self {
            f,
            dim,
            eps: APPROXIMATE_DERIVATIVE_EPS,
        }
    }

    /// Use a different finite-difference step.
    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.eps
    }

    pub fn evaluate(&self, point: &[f64]) -> Vec<f64> {
        check_dimension(point, self.dim);
        approximate_gradient(&self.f, point, self.eps)
    }
}

impl<F> Oracle for ApproximateGradient<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn value(&mut self, point: &[f64]) -> f64 {
        check_dimension(point, self.dim);
        (self.f)(point)
    }

    fn gradient(&mut self, point: &[f64]) -> Vec<f64> {
        ApproximateGradient::evaluate(self, point)
    }
}
