//! Symbolic derivatives checked against calculus and finite differences.

use crate::{
    Func, Input, Objective, Scalar, SymbolicFunction, SymbolicInput, approximate_derivative,
    approximate_gradient,
};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn test_every_function_matches_finite_difference() {
    for func in Func::ALL {
        let x = SymbolicInput::new(1);
        // an affine argument exercises the chain rule
        let f = (x.variable(0) * 0.5 + 0.1).apply(func);
        let df = f.differentiate(0);
        for p in [0.2, 0.4, 0.9] {
            let symbolic = df.evaluate(&[p]);
            let numeric = approximate_derivative(|q: &[f64]| func.apply(q[0] * 0.5 + 0.1), &[p], 0, 1e-4);
            assert!(
                approx_eq(symbolic, numeric, 1e-7),
                "{}'({}) = {} but finite difference gives {}",
                func,
                p,
                symbolic,
                numeric
            );
        }
    }
}

#[test]
fn test_arithmetic_rules() {
    let x = SymbolicInput::new(2);
    let a = x.variable(0);
    let b = x.variable(1);
    let p = [3.0, 5.0];

    assert_eq!((a + b).differentiate(0).evaluate(&p), 1.0);
    assert_eq!((a - b).differentiate(1).evaluate(&p), -1.0);
    assert_eq!((a * b).differentiate(0).evaluate(&p), 5.0);
    assert_eq!((a * b).differentiate(1).evaluate(&p), 3.0);
    // (b*1 - a*0) / b^2
    assert_eq!((a / b).differentiate(0).evaluate(&p), 5.0 / 25.0);
    // (b*0 - a*1) / b^2
    assert_eq!((a / b).differentiate(1).evaluate(&p), -3.0 / 25.0);
    assert_eq!((-a).differentiate(0).evaluate(&p), -1.0);
    assert_eq!((a * 4.0 - 2.0).differentiate(0).evaluate(&p), 4.0);
}

#[test]
fn test_constant_has_zero_derivative() {
    let x = SymbolicInput::new(1);
    let c = x.constant(7.0);
    assert_eq!(c.differentiate(0).evaluate(&[1.0]), 0.0);
}

#[test]
fn test_second_derivative() {
    let x = SymbolicInput::new(1);
    let v = x.variable(0);
    let cube = v * v * v;
    let d1 = cube.differentiate(0);
    let d2 = d1.differentiate(0);
    assert_eq!(d1.evaluate(&[2.0]), 12.0);
    assert_eq!(d2.evaluate(&[2.0]), 12.0);
    assert_eq!(d2.evaluate(&[-1.0]), -6.0);
}

#[test]
fn test_mixed_partials_agree() {
    let x = SymbolicInput::new(2);
    let (a, b) = (x.variable(0), x.variable(1));
    let f = a * b.sin() + a.exp() * b;
    let d01 = f.differentiate(0).differentiate(1);
    let d10 = f.differentiate(1).differentiate(0);
    for p in [[0.3, 0.7], [-1.0, 2.0]] {
        let expected = p[1].cos() + p[0].exp();
        assert!(approx_eq(d01.evaluate(&p), expected, 1e-14));
        assert!(approx_eq(d10.evaluate(&p), expected, 1e-14));
    }
}

#[test]
fn test_repeat_differentiation_reuses_nodes() {
    let x = SymbolicInput::new(2);
    let f = x.variable(0).sin() * x.variable(1);
    let first = f.differentiate(0);
    let len = x.arena().len();
    let second = f.differentiate(0);
    assert_eq!(first.node(), second.node());
    assert_eq!(x.arena().len(), len);
}

#[test]
fn test_deep_chain_differentiates_without_recursion() {
    let x = SymbolicInput::new(1);
    let mut y = x.variable(0).clone();
    for _ in 0..100_000 {
        y = &y + x.variable(0);
    }
    let dy = y.differentiate(0);
    assert_eq!(dy.evaluate(&[0.25]), 100_001.0);
}

#[test]
fn test_deep_function_chain_derivative() {
    let x = SymbolicInput::new(1);
    let mut y = x.variable(0).clone();
    for _ in 0..100_000 {
        y = y.sin();
    }
    let dy = y.differentiate(0);

    let (mut value, mut derivative) = (0.7_f64, 1.0_f64);
    for _ in 0..100_000 {
        derivative *= value.cos();
        value = value.sin();
    }
    assert!(approx_eq(dy.evaluate(&[0.7]), derivative, 1e-12));
}

struct Rosenbrock;

impl Objective for Rosenbrock {
    fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
        let d1 = x.constant(1.0) - x.at(0);
        let d2 = x.at(1) - x.at(0).sqr();
        d1.sqr() + d2.sqr() * 100.0
    }
}

#[test]
fn test_gradient_matches_closed_form() {
    let x = SymbolicInput::new(2);
    let mut gradient = SymbolicFunction::record(&Rosenbrock, &x).gradient();
    for p in [[-3.0, -4.0], [0.5, 0.25], [1.0, 1.0]] {
        let g = gradient.evaluate(&p);
        let expected = [
            -2.0 * (1.0 - p[0]) - 400.0 * p[0] * (p[1] - p[0] * p[0]),
            200.0 * (p[1] - p[0] * p[0]),
        ];
        assert!(approx_eq(g[0], expected[0], 1e-12), "{:?} vs {:?}", g, expected);
        assert!(approx_eq(g[1], expected[1], 1e-12), "{:?} vs {:?}", g, expected);
    }
}

#[test]
fn test_gradient_matches_finite_differences() {
    let x = SymbolicInput::new(2);
    let mut gradient = SymbolicFunction::record(&Rosenbrock, &x).gradient();
    let p = [0.3, -0.2];
    let symbolic = gradient.evaluate(&p);
    let numeric = approximate_gradient(|q: &[f64]| Rosenbrock.eval(q), &p, 1e-4);
    for (s, n) in symbolic.iter().zip(&numeric) {
        assert!(approx_eq(*s, *n, 1e-6), "{:?} vs {:?}", symbolic, numeric);
    }
}
