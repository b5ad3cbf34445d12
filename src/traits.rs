//! Capability traits that let one objective run eagerly or be recorded.
//!
//! An objective is written once against [`Input`]. Called with a numeric
//! point (`[f64]` or `Vec<f64>`) it computes an `f64`; called with a
//! [`SymbolicInput`](crate::SymbolicInput) it records an expression graph and
//! returns a [`Sym`](crate::Sym). The choice is made by the type system, never
//! by branching at runtime.

use crate::functions::Func;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A scalar an objective can compute with: `f64` in eager mode, `Sym` while recording.
pub trait Scalar:
    Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Apply one of the supported elementary functions.
    fn apply(self, func: Func) -> Self;

    fn sqr(self) -> Self {
        self.apply(Func::Sqr)
    }

    fn sqrt(self) -> Self {
        self.apply(Func::Sqrt)
    }

    fn exp(self) -> Self {
        self.apply(Func::Exp)
    }

    /// Natural logarithm.
    fn log(self) -> Self {
        self.apply(Func::Log)
    }

    fn sin(self) -> Self {
        self.apply(Func::Sin)
    }

    fn cos(self) -> Self {
        self.apply(Func::Cos)
    }

    fn tan(self) -> Self {
        self.apply(Func::Tan)
    }

    fn asin(self) -> Self {
        self.apply(Func::Asin)
    }

    fn acos(self) -> Self {
        self.apply(Func::Acos)
    }

    fn atan(self) -> Self {
        self.apply(Func::Atan)
    }
}

impl Scalar for f64 {
    #[inline]
    fn apply(self, func: Func) -> f64 {
        func.apply(self)
    }
}

impl Scalar for crate::Sym {
    fn apply(self, func: Func) -> Self {
        crate::Sym::apply(&self, func)
    }
}

/// Indexed access to the coordinates an objective is evaluated on.
pub trait Input {
    type Scalar: Scalar;

    /// Number of coordinates.
    fn dim(&self) -> usize;

    /// Coordinate `index`.
    ///
    /// # Panics
    /// If `index >= self.dim()`.
    fn at(&self, index: usize) -> Self::Scalar;

    /// A constant usable alongside the coordinates, e.g. to seed an accumulator.
    fn constant(&self, value: f64) -> Self::Scalar;
}

impl Input for [f64] {
    type Scalar = f64;

    fn dim(&self) -> usize {
        self.len()
    }

    #[inline]
    fn at(&self, index: usize) -> f64 {
        self[index]
    }

    fn constant(&self, value: f64) -> f64 {
        value
    }
}

impl Input for Vec<f64> {
    type Scalar = f64;

    fn dim(&self) -> usize {
        self.len()
    }

    #[inline]
    fn at(&self, index: usize) -> f64 {
        self[index]
    }

    fn constant(&self, value: f64) -> f64 {
        value
    }
}

/// A function to minimise, generic over how it is evaluated.
///
/// # Example
/// ```
/// use symdescent::{Input, Objective, Scalar};
///
/// struct Bowl;
///
/// impl Objective for Bowl {
///     fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
///         (x.at(0) - 3.0).sqr() + (x.at(1) + 2.0).sqr()
///     }
/// }
///
/// assert_eq!(Bowl.eval(&[3.0, -2.0][..]), 0.0);
/// ```
pub trait Objective {
    fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar;
}

impl<O: Objective + ?Sized> Objective for &O {
    fn eval<X: Input + ?Sized>(&self, x: &X) -> X::Scalar {
        (**self).eval(x)
    }
}
