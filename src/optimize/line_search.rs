//! Armijo backtracking along a search direction.

use super::ValueAndPoint;
use super::params::LineSearch;
use super::vector;
use crate::oracle::Oracle;

impl LineSearch {
    /// Shrink the step along `direction` until the Armijo condition holds.
    ///
    /// Starts at step 1 and multiplies by `beta` while
    /// `f(x + t*d) > f(x) - alpha * t * |g|^2` or the trial value is not
    /// finite, at most `max_steps` times. The last trial is returned even if
    /// the condition never held, unless it is not finite, in which case the
    /// current point is kept.
    pub(crate) fn search<O: Oracle + ?Sized>(
        &self,
        oracle: &mut O,
        current: &ValueAndPoint,
        gradient_norm_squared: f64,
        direction: &[f64],
    ) -> ValueAndPoint {
        let mut t = 1.0;
        let mut point = vector::step(&current.point, direction, t);
        let mut value = oracle.value(&point);
        let mut shrinks = 0;
        while shrinks < self.max_steps
            && (!value.is_finite()
                || value > current.value - self.alpha * t * gradient_norm_squared)
        {
            t *= self.beta;
            point = vector::step(&current.point, direction, t);
            value = oracle.value(&point);
            shrinks += 1;
        }
        if value.is_finite() {
            ValueAndPoint { value, point }
        } else {
            current.clone()
        }
    }
}
