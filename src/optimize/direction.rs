//! Optimization direction.
//!
//! The loops only ever minimize. Maximizing runs them on the negated
//! objective through [`Directed`], and the results are flipped back before
//! anyone outside the loop sees them.

use crate::oracle::{Oracle, ValueAndGradient};

/// Whether an optimizer looks for a minimum or a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimizationDirection {
    #[default]
    Minimize,
    Maximize,
}

impl OptimizationDirection {
    /// Convert a value between the caller's and the minimized view.
    #[inline]
    pub(crate) fn orient(self, value: f64) -> f64 {
        match self {
            Self::Minimize => value,
            Self::Maximize => -value,
        }
    }

    pub(crate) fn orient_vector(self, values: Vec<f64>) -> Vec<f64> {
        match self {
            Self::Minimize => values,
            Self::Maximize => values.into_iter().map(|v| -v).collect(),
        }
    }
}

/// Oracle seen through a direction: always something to minimize.
pub(crate) struct Directed<'a, O: ?Sized> {
    inner: &'a mut O,
    direction: OptimizationDirection,
}

impl<'a, O: Oracle + ?Sized> Directed<'a, O> {
    pub(crate) fn new(inner: &'a mut O, direction: OptimizationDirection) -> Self {
        Self { inner, direction }
    }
}

impl<O: Oracle + ?Sized> Oracle for Directed<'_, O> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn value(&mut self, point: &[f64]) -> f64 {
        self.direction.orient(self.inner.value(point))
    }

    fn gradient(&mut self, point: &[f64]) -> Vec<f64> {
        self.direction.orient_vector(self.inner.gradient(point))
    }

    fn value_and_gradient(&mut self, point: &[f64]) -> ValueAndGradient {
        let ValueAndGradient { value, gradient } = self.inner.value_and_gradient(point);
        ValueAndGradient {
            value: self.direction.orient(value),
            gradient: self.direction.orient_vector(gradient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ApproximateGradient;

    #[test]
    fn test_minimize_passes_through() {
        let mut oracle = ApproximateGradient::new(|p: &[f64]| 3.0 * p[0], 1);
        let mut directed = Directed::new(&mut oracle, OptimizationDirection::Minimize);
        assert_eq!(directed.value(&[2.0]), 6.0);
        assert!((directed.gradient(&[2.0])[0] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_maximize_negates_value_and_gradient() {
        let mut oracle = ApproximateGradient::new(|p: &[f64]| 3.0 * p[0], 1);
        let mut directed = Directed::new(&mut oracle, OptimizationDirection::Maximize);
        assert_eq!(directed.dim(), 1);
        assert_eq!(directed.value(&[2.0]), -6.0);
        let both = directed.value_and_gradient(&[2.0]);
        assert_eq!(both.value, -6.0);
        assert!((both.gradient[0] + 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_orient_is_an_involution() {
        let d = OptimizationDirection::Maximize;
        assert_eq!(d.orient(d.orient(1.5)), 1.5);
        assert_eq!(d.orient(2.0), -2.0);
        assert!(d.orient(f64::NAN).is_nan());
    }
}
