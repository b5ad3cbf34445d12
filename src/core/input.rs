//! The recording placeholder handed to objectives instead of a numeric point.

use super::arena::Arena;
use super::sym::Sym;
use crate::traits::Input;

/// Placeholder input of fixed dimension.
///
/// Passing it to an [`Objective`](crate::Objective) records the computation
/// into a fresh [`Arena`] rather than performing it. The variable nodes for
/// all coordinates are created up front, so they occupy indices `0..dim`.
pub struct SymbolicInput {
    arena: Arena,
    variables: Vec<Sym>,
}

impl SymbolicInput {
    /// Start a recording session for functions of `dim` variables.
    ///
    /// # Panics
    /// If `dim == 0`.
    pub fn new(dim: usize) -> Self {
        assert!(dim > 0, "a recording session needs at least one variable");
        let arena = Arena::new(dim);
        let variables = (0..dim).map(|i| arena.variable(i)).collect();
        Self { arena, variables }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn dim(&self) -> usize {
        self.variables.len()
    }

    /// The recorded value for coordinate `index`.
    ///
    /// # Panics
    /// If `index >= self.dim()`.
    pub fn variable(&self, index: usize) -> &Sym {
        assert!(
            index < self.variables.len(),
            "variable index {} out of range for dimension {}",
            index,
            self.variables.len()
        );
        &self.variables[index]
    }
}

impl Input for SymbolicInput {
    type Scalar = Sym;

    fn dim(&self) -> usize {
        self.variables.len()
    }

    fn at(&self, index: usize) -> Sym {
        self.variable(index).clone()
    }

    fn constant(&self, value: f64) -> Sym {
        self.arena.constant(value)
    }
}

impl std::fmt::Debug for SymbolicInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolicInput")
            .field("dim", &self.variables.len())
            .field("arena", &self.arena)
            .finish()
    }
}
