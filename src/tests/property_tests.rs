//! Property-Based Testing
//!
//! Uses quickcheck to check, on randomly generated expressions:
//! - Recorded evaluation reproduces eager `f64` evaluation bit for bit
//! - Symbolic derivatives agree with central finite differences

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{
    Func, Input, Objective, Op, Scalar, SymbolicFunction, SymbolicInput, approximate_gradient,
};

const DIM: usize = 2;

// ============================================================
// PART 1: EXPRESSION GENERATORS
// ============================================================

/// An expression tree that can be run eagerly or recorded.
#[derive(Debug, Clone)]
enum Recipe {
    Var(usize),
    Const(f64),
    Binary(Op, Box<Recipe>, Box<Recipe>),
    Unary(Func, Box<Recipe>),
}

impl Recipe {
    fn build<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
        match self {
            Recipe::Var(i) => x.at(*i),
            Recipe::Const(c) => x.constant(*c),
            Recipe::Binary(op, a, b) => {
                let (a, b) = (a.build(x), b.build(x));
                match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div => a / b,
                }
            }
            Recipe::Unary(func, a) => a.build(x).apply(*func),
        }
    }
}

impl Objective for Recipe {
    fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
        self.build(x)
    }
}

/// Dyadic constants in [-2, 2).
fn small_constant(g: &mut Gen) -> f64 {
    f64::from(i8::arbitrary(g)) / 64.0
}

/// Dyadic coordinates in [-1, 1).
fn coordinate(g: &mut Gen) -> f64 {
    f64::from(i8::arbitrary(g)) / 128.0
}

fn gen_recipe(g: &mut Gen, depth: usize, ops: &[Op], funcs: &[Func]) -> Recipe {
    if depth == 0 {
        return match u8::arbitrary(g) % 3 {
            0 => Recipe::Const(small_constant(g)),
            _ => Recipe::Var(usize::arbitrary(g) % DIM),
        };
    }
    match u8::arbitrary(g) % 5 {
        0 | 1 => {
            let op = ops[usize::arbitrary(g) % ops.len()];
            let a = gen_recipe(g, depth - 1, ops, funcs);
            let b = gen_recipe(g, depth - 1, ops, funcs);
            Recipe::Binary(op, Box::new(a), Box::new(b))
        }
        2 | 3 => {
            let func = funcs[usize::arbitrary(g) % funcs.len()];
            Recipe::Unary(func, Box::new(gen_recipe(g, depth - 1, ops, funcs)))
        }
        _ => gen_recipe(g, depth - 1, ops, funcs),
    }
}

/// Any expression over the full operator and function set, plus a point.
#[derive(Debug, Clone)]
struct AnyCase {
    recipe: Recipe,
    point: [f64; DIM],
}

impl Arbitrary for AnyCase {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(5);
        AnyCase {
            recipe: gen_recipe(g, depth, &Op::ALL, &Func::ALL),
            point: [coordinate(g), coordinate(g)],
        }
    }
}

/// Expressions that are smooth everywhere, so finite differences are reliable.
#[derive(Debug, Clone)]
struct SmoothCase {
    recipe: Recipe,
    point: [f64; DIM],
}

impl Arbitrary for SmoothCase {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(3);
        SmoothCase {
            recipe: gen_recipe(
                g,
                depth,
                &[Op::Add, Op::Sub, Op::Mul],
                &[Func::Sqr, Func::Sin, Func::Cos, Func::Atan],
            ),
            point: [coordinate(g), coordinate(g)],
        }
    }
}

// ============================================================
// PART 2: PROPERTIES
// ============================================================

#[test]
fn test_recorded_evaluation_is_bit_identical_to_eager() {
    fn prop(case: AnyCase) -> TestResult {
        let eager = case.recipe.eval(&case.point[..]);
        let x = SymbolicInput::new(DIM);
        let recorded = SymbolicFunction::record(&case.recipe, &x).evaluate(&case.point);
        if eager.is_nan() {
            TestResult::from_bool(recorded.is_nan())
        } else {
            TestResult::from_bool(eager.to_bits() == recorded.to_bits())
        }
    }
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(AnyCase) -> TestResult);
}

#[test]
fn test_symbolic_gradient_matches_finite_differences() {
    fn prop(case: SmoothCase) -> TestResult {
        let x = SymbolicInput::new(DIM);
        let symbolic = SymbolicFunction::record(&case.recipe, &x)
            .gradient()
            .evaluate(&case.point);
        let numeric = approximate_gradient(|p: &[f64]| case.recipe.eval(p), &case.point, 1e-4);
        let ok = symbolic
            .iter()
            .zip(&numeric)
            .all(|(s, n)| (s - n).abs() <= 1e-4 * (1.0 + s.abs()));
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(SmoothCase) -> TestResult);
}

#[test]
fn test_differentiation_is_memoized() {
    fn prop(case: SmoothCase) -> bool {
        let x = SymbolicInput::new(DIM);
        let f = SymbolicFunction::record(&case.recipe, &x);
        let first = f.gradient();
        let len = x.arena().len();
        let second = f.gradient();
        first.partials() == second.partials() && x.arena().len() == len
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(SmoothCase) -> bool);
}
