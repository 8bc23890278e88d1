//! Lexer and parser for the `assert-*` statement grammar.
//!
//! The data type produced by this crate, [`chronoq_ir::Assertion`], lives in
//! `chronoq-ir` so that `Instruction` can embed it without creating a
//! dependency cycle back into this crate. `chronoq-preprocess` is the only
//! consumer of [`parser::parse_assertion`]: it slices statement text and
//! swept-out block bodies out of source and hands them here one statement at
//! a time.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseResult, ParsingError};
pub use lexer::{tokenize, Token};
pub use parser::parse_assertion;
