//! SELECT statement AST.
//!
//! Lexing and parsing happen elsewhere; this module only defines the
//! [`Selects`] record the executor consumes and the pieces it is made of.

mod ast;

pub use ast::*;
