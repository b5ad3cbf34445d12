use super::params::{LineSearch, OptimizerParameters};
use super::vector;
use super::{ImprovementTracker, OptimizationResult, Optimizer, Run, StopReason};
use crate::error::OptimizeError;
use crate::oracle::Oracle;

/// Steepest descent with an Armijo backtracking line search.
///
/// Stops once the gradient norm drops below `grad_eps` (after at least
/// `min_steps` iterations), on the no-improvement rule, on a non-finite
/// gradient or when the stopping criterion asks.
///
/// Reads `max_steps`, `min_steps`, `grad_eps`, `bt_alpha`, `bt_beta`,
/// `bt_max_steps` and the no-improvement settings.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingGradientDescent {
    parameters: OptimizerParameters,
}

impl BacktrackingGradientDescent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: OptimizerParameters) -> Self {
        Self { parameters }
    }
}

impl Optimizer for BacktrackingGradientDescent {
    fn name(&self) -> &'static str {
        "BacktrackingGradientDescent"
    }

    fn parameters(&self) -> &OptimizerParameters {
        &self.parameters
    }

    fn optimize_oracle<O: Oracle + ?Sized>(
        &self,
        oracle: &mut O,
        starting_point: &[f64],
    ) -> Result<OptimizationResult, OptimizeError> {
        let mut run = Run::new(self.name(), &self.parameters)?;
        let line_search = LineSearch::resolve(&self.parameters)?;
        let mut oracle = run.orient(oracle);
        let mut current = run.start(&mut oracle, starting_point)?;
        let mut tracker = ImprovementTracker::new(&run.settings);
        let mut stop_reason = StopReason::MaxStepsExhausted;
        let mut iteration = 0;

        while iteration < run.settings.max_steps {
            run.iteration(iteration, &current);
            let gradient = oracle.gradient(&current.point);
            if run.stop_requested(iteration, &current, &gradient) {
                stop_reason = StopReason::StoppingCriterion;
                break;
            }
            if !vector::all_finite(&gradient) {
                stop_reason = StopReason::NonFiniteGradient;
                break;
            }
            let gradient_norm_squared = vector::norm_squared(&gradient);
            if gradient_norm_squared.sqrt() < run.settings.grad_eps
                && iteration >= run.settings.min_steps
            {
                run.log(|| "Terminating due to small gradient norm.".to_string());
                stop_reason = StopReason::Converged;
                break;
            }

            let direction = vector::negated(&gradient);
            let next = line_search.search(&mut oracle, &current, gradient_norm_squared, &direction);

            if tracker.stalled(current.value, next.value) {
                run.log(|| "Terminating due to no improvement.".to_string());
                stop_reason = StopReason::NoImprovement;
                break;
            }
            iteration += 1;
            current = next;
        }

        Ok(run.finish(current, iteration, stop_reason))
    }
}
