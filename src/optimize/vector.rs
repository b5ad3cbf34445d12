//! Small dense-vector helpers for the optimizer loops.

/// `point + k * direction`
pub(crate) fn step(point: &[f64], direction: &[f64], k: f64) -> Vec<f64> {
    debug_assert_eq!(point.len(), direction.len());
    point
        .iter()
        .zip(direction)
        .map(|(p, d)| p + k * d)
        .collect()
}

/// `ka * a + kb * b`
pub(crate) fn combine(a: &[f64], ka: f64, b: &[f64], kb: f64) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| ka * x + kb * y).collect()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn norm_squared(v: &[f64]) -> f64 {
    dot(v, v)
}

pub(crate) fn negated(v: &[f64]) -> Vec<f64> {
    v.iter().map(|x| -x).collect()
}

pub(crate) fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Polak–Ribière coefficient, clamped at zero.
///
/// Any non-finite intermediate (for example a zero previous gradient) yields
/// zero, which restarts conjugate gradient along steepest descent.
pub(crate) fn polak_ribiere(gradient: &[f64], previous: &[f64]) -> f64 {
    let beta = (norm_squared(gradient) - dot(gradient, previous)) / norm_squared(previous);
    if beta.is_finite() { beta.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        assert_eq!(step(&[1.0, 2.0], &[3.0, -1.0], 0.5), vec![2.5, 1.5]);
        assert_eq!(combine(&[1.0, 2.0], 2.0, &[3.0, 4.0], -1.0), vec![-1.0, 0.0]);
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(norm_squared(&[3.0, 4.0]), 25.0);
        assert_eq!(negated(&[1.0, -2.0]), vec![-1.0, 2.0]);
        assert!(all_finite(&[0.0, -1e300]));
        assert!(!all_finite(&[0.0, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY]));
    }

    #[test]
    fn test_polak_ribiere() {
        // (|g|^2 - g.g_prev) / |g_prev|^2 = (5 - 1) / 1
        assert_eq!(polak_ribiere(&[1.0, 2.0], &[1.0, 0.0]), 4.0);
        // negative coefficient clamps to zero
        assert_eq!(polak_ribiere(&[0.5, 0.0], &[1.0, 0.0]), 0.0);
        // zero previous gradient
        assert_eq!(polak_ribiere(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(polak_ribiere(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}
