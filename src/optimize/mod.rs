//! Gradient-based minimizers.
//!
//! Three algorithms share one configuration type and one result type:
//! - [`GradientDescent`]: fixed trial steps, keeps the best
//! - [`BacktrackingGradientDescent`]: steepest descent with an Armijo line search
//! - [`ConjugateGradient`]: Polak–Ribière nonlinear conjugate gradient
//!
//! [`Optimizer::optimize`] records the objective once, differentiates it
//! symbolically and then runs on the compiled oracle.
//! [`Optimizer::optimize_oracle`] runs on any [`Oracle`], including the
//! finite-difference [`ApproximateGradient`](crate::ApproximateGradient).
//!
//! Every algorithm can also maximize, see
//! [`OptimizerParameters::with_direction`].

mod backtracking;
mod conjugate_gradient;
mod direction;
mod gradient_descent;
mod line_search;
mod logger;
mod params;
mod vector;

pub use backtracking::BacktrackingGradientDescent;
pub use conjugate_gradient::ConjugateGradient;
pub use direction::OptimizationDirection;
pub use gradient_descent::GradientDescent;
pub use logger::LogSink;
pub use params::{
    DEFAULT_BT_ALPHA, DEFAULT_BT_BETA, DEFAULT_BT_MAX_STEPS, DEFAULT_GRAD_EPS,
    DEFAULT_MAX_STEPS, DEFAULT_MIN_ABSOLUTE_IMPROVEMENT, DEFAULT_MIN_RELATIVE_IMPROVEMENT,
    DEFAULT_MIN_STEPS, DEFAULT_NO_IMPROVEMENT_STEPS, DEFAULT_STEP_FACTOR, OptimizerParameters,
    PointFormatter, StoppingCriterion,
};

use crate::error::OptimizeError;
use crate::oracle::{Oracle, SymbolicOracle};
use crate::traits::Objective;
use direction::Directed;
use logger::Logger;
use params::Settings;

/// An objective value together with the point it was measured at.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAndPoint {
    pub value: f64,
    pub point: Vec<f64>,
}

/// Why an optimizer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The gradient (or search direction) norm fell below `grad_eps`.
    Converged,
    /// `max_steps` iterations ran.
    MaxStepsExhausted,
    /// Too many consecutive steps failed to improve the objective.
    NoImprovement,
    /// The installed stopping criterion asked to stop.
    StoppingCriterion,
    /// The gradient at the current point contained `NaN` or infinity.
    NonFiniteGradient,
}

/// Answer of a [`StoppingCriterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EarlyStopping {
    Stop,
    Continue,
}

/// Outcome of an optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Objective value at `point`.
    pub value: f64,
    pub point: Vec<f64>,
    /// Index of the iteration the run ended in. A step thrown away by the
    /// no-improvement rule does not count.
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Objective value at the start of every iteration entered, when
    /// [`OptimizerParameters::track_progress`] is set.
    pub progress: Option<Vec<f64>>,
}

impl OptimizationResult {
    pub fn value_and_point(&self) -> ValueAndPoint {
        ValueAndPoint {
            value: self.value,
            point: self.point.clone(),
        }
    }
}

/// A gradient-based minimizer.
pub trait Optimizer {
    /// Name used as the prefix of progress log lines.
    fn name(&self) -> &'static str;

    fn parameters(&self) -> &OptimizerParameters;

    /// Minimize the function behind `oracle`, starting from `starting_point`.
    ///
    /// # Errors
    /// - [`OptimizeError::EmptyStartingPoint`] for an empty start
    /// - [`OptimizeError::DimensionMismatch`] when the start and the oracle disagree
    /// - [`OptimizeError::InvalidParameter`] for out-of-range settings
    /// - [`OptimizeError::NonFiniteObjective`] when the start evaluates to `NaN` or infinity
    fn optimize_oracle<O: Oracle + ?Sized>(
        &self,
        oracle: &mut O,
        starting_point: &[f64],
    ) -> Result<OptimizationResult, OptimizeError>;

    /// Record `objective`, differentiate it symbolically and minimize it.
    ///
    /// The dimension is taken from `starting_point`. The recording lives in a
    /// fresh arena owned by this call.
    ///
    /// # Example
    /// ```
    /// use symdescent::{BacktrackingGradientDescent, Input, Objective, Optimizer};
    ///
    /// struct Shifted;
    ///
    /// impl Objective for Shifted {
    ///     fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
    ///         let dx = x.at(0) - 3.0;
    ///         let dy = x.at(1) + 2.0;
    ///         dx.clone() * dx + dy.clone() * dy
    ///     }
    /// }
    ///
    /// let result = BacktrackingGradientDescent::new()
    ///     .optimize(&Shifted, &[0.0, 0.0])
    ///     .unwrap();
    /// assert!((result.point[0] - 3.0).abs() < 1e-4);
    /// assert!((result.point[1] + 2.0).abs() < 1e-4);
    /// ```
    fn optimize<F: Objective + ?Sized>(
        &self,
        objective: &F,
        starting_point: &[f64],
    ) -> Result<OptimizationResult, OptimizeError> {
        if starting_point.is_empty() {
            return Err(OptimizeError::EmptyStartingPoint);
        }
        let logger = Logger::new(self.parameters());
        let mut oracle = SymbolicOracle::record(objective, starting_point.len());
        logger.log(|| format!("{}: The objective function is {} nodes.", self.name(), oracle.node_count()));
        oracle.symbolic_gradient();
        logger.log(|| {
            format!(
                "{}: Augmented with the gradient the function is {} nodes.",
                self.name(),
                oracle.node_count()
            )
        });
        self.optimize_oracle(&mut oracle, starting_point)
    }
}

/// Per-run plumbing shared by the optimizer loops.
///
/// The loops work on the minimized view of the objective. Everything `Run`
/// hands back to the caller (log lines, the stopping criterion, progress and
/// the result) is in the caller's direction.
pub(crate) struct Run<'a> {
    name: &'static str,
    parameters: &'a OptimizerParameters,
    logger: Logger,
    direction: OptimizationDirection,
    progress: Option<Vec<f64>>,
    pub settings: Settings,
}

impl<'a> Run<'a> {
    pub(crate) fn new(name: &'static str, parameters: &'a OptimizerParameters) -> Result<Self, OptimizeError> {
        Ok(Self {
            name,
            parameters,
            logger: Logger::new(parameters),
            direction: parameters.direction(),
            progress: parameters.tracks_progress().then(Vec::new),
            settings: Settings::resolve(parameters)?,
        })
    }

    /// Wrap `oracle` so that the loop always minimizes.
    pub(crate) fn orient<'o, O: Oracle + ?Sized>(&self, oracle: &'o mut O) -> Directed<'o, O> {
        Directed::new(oracle, self.direction)
    }

    pub(crate) fn log(&self, message: impl FnOnce() -> String) {
        self.logger.log(|| format!("{}: {}", self.name, message()));
    }

    fn format_point(&self, point: &[f64]) -> String {
        match self.parameters.point_formatter() {
            Some(formatter) => formatter(point),
            None => format!("{:?}", point),
        }
    }

    /// Validate the start and evaluate the objective there.
    pub(crate) fn start<O: Oracle + ?Sized>(
        &self,
        oracle: &mut O,
        starting_point: &[f64],
    ) -> Result<ValueAndPoint, OptimizeError> {
        if starting_point.is_empty() {
            return Err(OptimizeError::EmptyStartingPoint);
        }
        if starting_point.len() != oracle.dim() {
            return Err(OptimizeError::DimensionMismatch {
                expected: oracle.dim(),
                got: starting_point.len(),
            });
        }
        let value = oracle.value(starting_point);
        if !value.is_finite() {
            return Err(OptimizeError::NonFiniteObjective {
                value: self.direction.orient(value),
            });
        }
        self.log(|| {
            format!(
                "Starting from {} with value {}.",
                self.format_point(starting_point),
                self.direction.orient(value)
            )
        });
        Ok(ValueAndPoint {
            value,
            point: starting_point.to_vec(),
        })
    }

    pub(crate) fn iteration(&mut self, iteration: usize, current: &ValueAndPoint) {
        let value = self.direction.orient(current.value);
        if let Some(progress) = self.progress.as_mut() {
            progress.push(value);
        }
        self.log(|| {
            format!(
                "Iteration {}, OF = {} @ {}",
                iteration + 1,
                value,
                self.format_point(&current.point)
            )
        });
    }

    /// Ask the installed stopping criterion, if any.
    pub(crate) fn stop_requested(&self, iteration: usize, current: &ValueAndPoint, gradient: &[f64]) -> bool {
        let Some(criterion) = self.parameters.stopping_criterion() else {
            return false;
        };
        let answer = match self.direction {
            OptimizationDirection::Minimize => criterion(iteration, current, gradient),
            OptimizationDirection::Maximize => {
                let current = ValueAndPoint {
                    value: -current.value,
                    point: current.point.clone(),
                };
                let gradient = vector::negated(gradient);
                criterion(iteration, &current, &gradient)
            }
        };
        answer == EarlyStopping::Stop
    }

    pub(crate) fn finish(self, current: ValueAndPoint, iterations: usize, stop_reason: StopReason) -> OptimizationResult {
        let value = self.direction.orient(current.value);
        self.log(|| {
            format!(
                "Result = {} after {} iterations ({:?}), OF value = {}.",
                self.format_point(&current.point),
                iterations,
                stop_reason,
                value
            )
        });
        OptimizationResult {
            value,
            point: current.point,
            iterations,
            stop_reason,
            progress: self.progress,
        }
    }
}

/// Counts consecutive steps that barely move the objective.
pub(crate) struct ImprovementTracker {
    min_absolute: f64,
    min_relative: f64,
    limit: usize,
    stalled_steps: usize,
}

impl ImprovementTracker {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            min_absolute: settings.min_absolute_improvement,
            min_relative: settings.min_relative_improvement,
            limit: settings.no_improvement_steps,
            stalled_steps: 0,
        }
    }

    /// Record a step from `current` to `next`; true when the run should end.
    pub(crate) fn stalled(&mut self, current: f64, next: f64) -> bool {
        let gain = current - next;
        let no_improvement = gain < self.min_absolute || gain / current.abs() < self.min_relative;
        if no_improvement {
            self.stalled_steps += 1;
            self.stalled_steps >= self.limit
        } else {
            self.stalled_steps = 0;
            false
        }
    }
}
