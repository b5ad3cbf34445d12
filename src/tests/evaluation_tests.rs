//! Recording and evaluation through the public API.

use crate::{Arena, Input, Node, Objective, Op, Scalar, SymbolicFunction, SymbolicInput};

struct Mixed;

impl Objective for Mixed {
    fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
        let a = x.at(0);
        let b = x.at(1);
        let mut acc = x.constant(0.5);
        acc += a.clone().sin() * b.clone();
        acc -= (a.clone() / (b.clone() + 2.0)).exp();
        acc *= a.clone().sqr().atan();
        acc + (b * 0.25).cos().sqrt() - -a
    }
}

#[test]
fn test_recorded_matches_eager_bit_for_bit() {
    let x = SymbolicInput::new(2);
    let mut f = SymbolicFunction::record(&Mixed, &x);
    for point in [[0.3, -0.7], [1.5, 2.5], [-2.0, 0.125], [0.0, 0.0]] {
        let eager = Mixed.eval(&point[..]);
        let recorded = f.evaluate(&point);
        assert_eq!(eager.to_bits(), recorded.to_bits(), "at {:?}", point);
    }
}

#[test]
fn test_vec_input_runs_eagerly() {
    let point = vec![0.3, -0.7];
    assert_eq!(Mixed.eval(&point), Mixed.eval(&point[..]));
}

#[test]
fn test_shared_subexpression_is_stored_once() {
    let x = SymbolicInput::new(1);
    let before = x.arena().len();
    let s = x.variable(0).sin();
    let f = &s * &s;
    assert_eq!(x.arena().len(), before + 2);
    match x.arena().node(f.node()) {
        Node::Operation { op, lhs, rhs } => {
            assert_eq!(op, Op::Mul);
            assert_eq!(lhs, s.node());
            assert_eq!(rhs, s.node());
        }
        other => panic!("expected a product, got {:?}", other),
    }
    assert_eq!(f.evaluate(&[1.0]), 1.0_f64.sin() * 1.0_f64.sin());
}

#[test]
fn test_deep_chain_evaluates_without_recursion() {
    let x = SymbolicInput::new(1);
    let mut y = x.variable(0).clone();
    for _ in 0..100_000 {
        y = &y + x.variable(0);
    }
    assert_eq!(y.evaluate(&[1.0]), 100_001.0);
    assert_eq!(y.evaluate(&[0.5]), 50_000.5);
}

#[test]
fn test_deep_function_chain_matches_eager() {
    let x = SymbolicInput::new(1);
    let mut y = x.variable(0).clone();
    let mut eager = 0.7_f64;
    for _ in 0..100_000 {
        y = y.sin();
        eager = eager.sin();
    }
    assert_eq!(y.evaluate(&[0.7]).to_bits(), eager.to_bits());
    // rendering a deep chain must not recurse either
    let text = y.to_string();
    assert!(text.starts_with("sin(sin("));
    assert!(text.ends_with(&format!("x[0]{}", ")".repeat(100_000))));
    assert_eq!(text.matches(')').count(), 100_000);
}

#[test]
fn test_domain_errors_propagate_as_ieee_values() {
    let x = SymbolicInput::new(1);
    let v = x.variable(0);
    assert!(v.sqrt().evaluate(&[-1.0]).is_nan());
    assert!(v.log().evaluate(&[-1.0]).is_nan());
    assert_eq!(v.log().evaluate(&[0.0]), f64::NEG_INFINITY);
    assert!(v.asin().evaluate(&[2.0]).is_nan());
    assert_eq!((1.0 / v).evaluate(&[0.0]), f64::INFINITY);
    assert_eq!((-1.0 / v).evaluate(&[0.0]), f64::NEG_INFINITY);
}

#[test]
fn test_arena_reset_allows_new_recording() {
    let arena = Arena::new(2);
    let f = arena.variable(0) * arena.variable(1);
    assert_eq!(f.evaluate(&[2.0, 3.0]), 6.0);
    arena.reset();
    assert!(arena.is_empty());

    let g = arena.variable(1) - 1.0;
    assert_eq!(g.evaluate(&[2.0, 3.0]), 2.0);
    assert_eq!(arena.len(), 3);
}

#[test]
fn test_independent_sessions_do_not_interfere() {
    let a = SymbolicInput::new(1);
    let b = SymbolicInput::new(1);
    let fa = a.variable(0) * 2.0;
    let fb = b.variable(0) * 3.0;
    assert!(!a.arena().same_as(b.arena()));
    assert_eq!(fa.evaluate(&[1.0]), 2.0);
    assert_eq!(fb.evaluate(&[1.0]), 3.0);
    assert_eq!(a.arena().len(), b.arena().len());
}

#[test]
#[should_panic(expected = "different arenas")]
fn test_mixing_sessions_panics() {
    let a = SymbolicInput::new(1);
    let b = SymbolicInput::new(1);
    let _ = a.variable(0) + b.variable(0);
}
