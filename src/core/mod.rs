//! Expression graph core: nodes, the arena that owns them, and the recorded
//! scalar type objectives compute with while being recorded.

mod arena;
mod display;
mod input;
mod node;
mod sym;

pub(crate) use arena::Graph;
pub use arena::Arena;
pub use input::SymbolicInput;
pub use node::{Node, NodeRef, Op};
pub use sym::Sym;
