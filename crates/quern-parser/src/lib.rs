//! SQL lexer and parser.
//!
//! The pipeline front half: raw SQL text goes through [`lexer::tokenize`]
//! into a flat token stream, then through [`parser::parse`] into a generic
//! rule-tagged [`cst::ParseTree`]. The parse tree is deliberately concrete
//! and uniform; all shaping into the typed AST happens in the lowering
//! crate.
//!
//! Errors at every stage carry 1-based line/column positions pointing at the
//! offending token.

pub mod cst;
pub mod lexer;
pub mod parser;
pub mod token;

pub use cst::{ParseTree, RuleKind};
pub use lexer::tokenize;
pub use parser::parse;
pub use token::{Token, TokenKind};
