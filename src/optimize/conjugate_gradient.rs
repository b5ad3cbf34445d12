use super::params::{LineSearch, OptimizerParameters};
use super::vector;
use super::{ImprovementTracker, OptimizationResult, Optimizer, Run, StopReason};
use crate::error::OptimizeError;
use crate::oracle::Oracle;

/// Nonlinear conjugate gradient with the Polak–Ribière update.
///
/// The first direction is the negative gradient. Each step line-searches
/// along the current direction with the same Armijo backtracking as
/// [`BacktrackingGradientDescent`](super::BacktrackingGradientDescent), then
/// sets `s = beta * s - g` with `beta = max(0, PR)`. A non-finite `PR`
/// restarts along steepest descent. Convergence is declared when the
/// direction norm drops below `grad_eps` after at least `min_steps`
/// iterations.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    parameters: OptimizerParameters,
}

impl ConjugateGradient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: OptimizerParameters) -> Self {
        Self { parameters }
    }
}

impl Optimizer for ConjugateGradient {
    fn name(&self) -> &'static str {
        "ConjugateGradient"
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

        let mut gradient = oracle.gradient(&current.point);
        let mut direction = vector::negated(&gradient);

        while iteration < run.settings.max_steps {
            run.iteration(iteration, &current);
            if run.stop_requested(iteration, &current, &gradient) {
                stop_reason = StopReason::StoppingCriterion;
                break;
            }
            if !vector::all_finite(&gradient) {
                stop_reason = StopReason::NonFiniteGradient;
                break;
            }
            let direction_norm = vector::norm_squared(&direction).sqrt();
            if direction_norm < run.settings.grad_eps && iteration >= run.settings.min_steps {
                run.log(|| "Terminating due to small direction norm.".to_string());
                stop_reason = StopReason::Converged;
                break;
            }

            let next = line_search.search(
                &mut oracle,
                &current,
                vector::norm_squared(&gradient),
                &direction,
            );
            let next_gradient = oracle.gradient(&next.point);
            let beta = vector::polak_ribiere(&next_gradient, &gradient);
            direction = vector::combine(&direction, beta, &next_gradient, -1.0);

            if tracker.stalled(current.value, next.value) {
                run.log(|| "Terminating due to no improvement.".to_string());
                stop_reason = StopReason::NoImprovement;
                break;
            }
            iteration += 1;
            current = next;
            gradient = next_gradient;
        }

        Ok(run.finish(current, iteration, stop_reason))
    }
}
