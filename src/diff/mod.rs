//! Symbolic differentiation over the expression arena.

mod engine;

pub(crate) use engine::{DerivativeCache, differentiate};
