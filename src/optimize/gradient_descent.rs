use super::params::{DEFAULT_STEP_FACTOR, OptimizerParameters, positive};
use super::vector;
use super::{ImprovementTracker, OptimizationResult, Optimizer, Run, StopReason, ValueAndPoint};
use crate::error::OptimizeError;
use crate::oracle::Oracle;

/// Trial step sizes, each multiplied by `step_factor`.
const STEP_SIZES: [f64; 3] = [0.01, 0.05, 0.2];

/// Plain gradient descent.
///
/// Every iteration tries three fixed steps against the gradient and moves to
/// the best of the current point and the trials. Non-finite trials are
/// ignored. There is no gradient-norm test: runs end on `max_steps`, the
/// no-improvement rule, or the stopping criterion.
///
/// Reads `max_steps`, `step_factor` and the no-improvement settings.
#[derive(Debug, Clone, Default)]
pub struct GradientDescent {
    parameters: OptimizerParameters,
}

impl GradientDescent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: OptimizerParameters) -> Self {
        Self { parameters }
    }
}

impl Optimizer for GradientDescent {
    fn name(&self) -> &'static str {
        "GradientDescent"
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
        let step_factor = positive(&self.parameters, "step_factor", DEFAULT_STEP_FACTOR)?;
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

            let mut best = current.clone();
            for step in STEP_SIZES {
                let point = vector::step(&current.point, &gradient, -step * step_factor);
                let value = oracle.value(&point);
                if value.is_finite() && value < best.value {
                    best = ValueAndPoint { value, point };
                }
            }

            if tracker.stalled(current.value, best.value) {
                run.log(|| "Terminating due to no improvement.".to_string());
                stop_reason = StopReason::NoImprovement;
                break;
            }
            iteration += 1;
            current = best;
        }

        Ok(run.finish(current, iteration, stop_reason))
    }
}
