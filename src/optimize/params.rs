//! Optimizer configuration: named numeric knobs plus optional callbacks.

use super::direction::OptimizationDirection;
use super::logger::LogSink;
use super::{EarlyStopping, ValueAndPoint};
use crate::error::OptimizeError;
use num_traits::{NumCast, ToPrimitive};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Maximum number of optimization steps.
pub const DEFAULT_MAX_STEPS: usize = 5000;
/// Minimum number of steps before gradient-norm early stopping may fire.
pub const DEFAULT_MIN_STEPS: usize = 3;
/// Plain gradient descent multiplies every trial step by this factor.
pub const DEFAULT_STEP_FACTOR: f64 = 1.0;
/// Sufficient-decrease constant of the Armijo condition.
pub const DEFAULT_BT_ALPHA: f64 = 0.5;
/// Step shrink factor of the backtracking line search.
pub const DEFAULT_BT_BETA: f64 = 0.8;
/// Maximum number of backtracking shrinks per line search.
pub const DEFAULT_BT_MAX_STEPS: usize = 100;
/// Gradient norm below which a run counts as converged.
pub const DEFAULT_GRAD_EPS: f64 = 1e-8;
/// A step improving the objective by less than this counts as no improvement.
pub const DEFAULT_MIN_ABSOLUTE_IMPROVEMENT: f64 = 1e-25;
/// A step improving the objective by less than this ratio counts as no improvement.
pub const DEFAULT_MIN_RELATIVE_IMPROVEMENT: f64 = 1e-25;
/// Consecutive no-improvement steps that end a run.
pub const DEFAULT_NO_IMPROVEMENT_STEPS: usize = 2;

/// External early-stopping hook: `(iterations_done, current, gradient)`.
pub type StoppingCriterion = Arc<dyn Fn(usize, &ValueAndPoint, &[f64]) -> EarlyStopping + Send + Sync>;

/// Renders points in progress logs.
pub type PointFormatter = Arc<dyn Fn(&[f64]) -> String + Send + Sync>;

/// Named optimizer settings.
///
/// Values are stored as `f64` under string keys, in key order. Unset keys
/// resolve to whatever default the reader supplies.
///
/// # Example
/// ```
/// use symdescent::OptimizerParameters;
///
/// let params = OptimizerParameters::new()
///     .with("max_steps", 250)
///     .with("bt_beta", 0.5);
/// assert_eq!(params.get("max_steps", 5000_usize), 250);
/// assert_eq!(params.get("grad_eps", 1e-6), 1e-6);
/// ```
#[derive(Clone, Default)]
pub struct OptimizerParameters {
    values: BTreeMap<String, f64>,
    stopping_criterion: Option<StoppingCriterion>,
    point_formatter: Option<PointFormatter>,
    logger: Option<LogSink>,
    direction: OptimizationDirection,
    track_progress: bool,
}

impl OptimizerParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`. Values not representable as `f64` are ignored.
    pub fn set<T: ToPrimitive>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        if let Some(v) = value.to_f64() {
            self.values.insert(name.into(), v);
        }
        self
    }

    /// Builder form of [`set`](Self::set).
    pub fn with<T: ToPrimitive>(mut self, name: impl Into<String>, value: T) -> Self {
        self.set(name, value);
        self
    }

    /// Value of `name` converted to `T`, or `default` when unset or not
    /// representable in `T`.
    pub fn get<T: NumCast>(&self, name: &str, default: T) -> T {
        self.values
            .get(name)
            .and_then(|&v| T::from(v))
            .unwrap_or(default)
    }

    /// Raw stored value, if any.
    pub fn raw(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All set values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Install an external early-stopping check, consulted once per iteration.
    pub fn with_stopping_criterion<F>(mut self, criterion: F) -> Self
    where
        F: Fn(usize, &ValueAndPoint, &[f64]) -> EarlyStopping + Send + Sync + 'static,
    {
        self.stopping_criterion = Some(Arc::new(criterion));
        self
    }

    /// Control how points are printed in progress logs.
    pub fn with_point_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&[f64]) -> String + Send + Sync + 'static,
    {
        self.point_formatter = Some(Arc::new(formatter));
        self
    }

    /// Send progress lines to `sink` instead of the environment-controlled default.
    pub fn with_logger<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(sink));
        self
    }

    /// Look for a maximum (or explicitly a minimum) instead of the default minimum.
    pub fn with_direction(mut self, direction: OptimizationDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Keep the objective value of every iteration in
    /// [`OptimizationResult::progress`](super::OptimizationResult::progress).
    pub fn track_progress(mut self) -> Self {
        self.track_progress = true;
        self
    }

    pub fn direction(&self) -> OptimizationDirection {
        self.direction
    }

    pub fn tracks_progress(&self) -> bool {
        self.track_progress
    }

    pub(crate) fn stopping_criterion(&self) -> Option<&StoppingCriterion> {
        self.stopping_criterion.as_ref()
    }

    pub(crate) fn point_formatter(&self) -> Option<&PointFormatter> {
        self.point_formatter.as_ref()
    }

    pub(crate) fn logger(&self) -> Option<&LogSink> {
        self.logger.as_ref()
    }
}

impl fmt::Debug for OptimizerParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerParameters")
            .field("values", &self.values)
            .field("stopping_criterion", &self.stopping_criterion.is_some())
            .field("point_formatter", &self.point_formatter.is_some())
            .field("logger", &self.logger.is_some())
            .field("direction", &self.direction)
            .field("track_progress", &self.track_progress)
            .finish()
    }
}

// ===== Validated readers =====

/// Counts above `usize::MAX` saturate, so a huge value means "unbounded".
fn count(params: &OptimizerParameters, name: &str, default: usize) -> Result<usize, OptimizeError> {
    match params.raw(name) {
        None => Ok(default),
        Some(v) if !(v.is_finite() && v >= 0.0) => Err(OptimizeError::invalid_parameter(
            name,
            v,
            "must be a finite non-negative count",
        )),
        Some(v) => Ok(<usize as NumCast>::from(v).unwrap_or(usize::MAX)),
    }
}

fn open_unit(params: &OptimizerParameters, name: &str, default: f64) -> Result<f64, OptimizeError> {
    let v = params.get(name, default);
    if v > 0.0 && v < 1.0 {
        Ok(v)
    } else {
        Err(OptimizeError::invalid_parameter(name, v, "must be in (0, 1)"))
    }
}

pub(crate) fn positive(params: &OptimizerParameters, name: &str, default: f64) -> Result<f64, OptimizeError> {
    let v = params.get(name, default);
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(OptimizeError::invalid_parameter(name, v, "must be finite and positive"))
    }
}

fn non_negative(params: &OptimizerParameters, name: &str, default: f64) -> Result<f64, OptimizeError> {
    let v = params.get(name, default);
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(OptimizeError::invalid_parameter(name, v, "must be finite and non-negative"))
    }
}

/// Loop controls shared by every optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Settings {
    pub max_steps: usize,
    pub min_steps: usize,
    pub grad_eps: f64,
    pub min_absolute_improvement: f64,
    pub min_relative_improvement: f64,
    pub no_improvement_steps: usize,
}

impl Settings {
    pub(crate) fn resolve(params: &OptimizerParameters) -> Result<Self, OptimizeError> {
        Ok(Self {
            max_steps: count(params, "max_steps", DEFAULT_MAX_STEPS)?,
            min_steps: count(params, "min_steps", DEFAULT_MIN_STEPS)?,
            grad_eps: non_negative(params, "grad_eps", DEFAULT_GRAD_EPS)?,
            min_absolute_improvement: non_negative(
                params,
                "min_absolute_per_step_improvement",
                DEFAULT_MIN_ABSOLUTE_IMPROVEMENT,
            )?,
            min_relative_improvement: non_negative(
                params,
                "min_relative_per_step_improvement",
                DEFAULT_MIN_RELATIVE_IMPROVEMENT,
            )?,
            no_improvement_steps: count(
                params,
                "no_improvement_steps_to_terminate",
                DEFAULT_NO_IMPROVEMENT_STEPS,
            )?,
        })
    }
}

/// Armijo backtracking controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineSearch {
    pub alpha: f64,
    pub beta: f64,
    pub max_steps: usize,
}

impl LineSearch {
    pub(crate) fn resolve(params: &OptimizerParameters) -> Result<Self, OptimizeError> {
        Ok(Self {
            alpha: open_unit(params, "bt_alpha", DEFAULT_BT_ALPHA)?,
            beta: open_unit(params, "bt_beta", DEFAULT_BT_BETA)?,
            max_steps: count(params, "bt_max_steps", DEFAULT_BT_MAX_STEPS)?,
        })
    }
}
