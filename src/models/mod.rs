//! Model reconstruction from exchange-file headers.
//!
//! Expressions are parsed into a sandboxed AST (`expr`) and wrapped with the
//! model's name, variable and parameter list (`descriptor`).

pub mod descriptor;
pub mod expr;

pub use descriptor::*;
pub use expr::{Expr, SymbolTable};
