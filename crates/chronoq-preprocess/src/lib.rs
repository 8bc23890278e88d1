//! Source preprocessor: turns raw assembly text into the flat instruction
//! list the rest of the workspace operates on (spec §4.A/§4.B).
//!
//! The pipeline is a fixed sequence of small, independently testable passes:
//! strip comments, sweep `{ … }` bodies into synthetic tokens so `;` becomes
//! a reliable statement terminator, split into statements, then recursively
//! build instructions (descending into gate bodies with their formal
//! parameters shadowing outer register names). [`builder::preprocess`] wires
//! the passes together and assigns every instruction's control-flow
//! successor in one final pass.

pub mod blocks;
pub mod builder;
pub mod comments;
pub mod error;
pub mod statement;
pub mod targets;

pub use builder::{preprocess, FunctionDef, PreprocessedProgram};
pub use error::{PreprocessError, PreprocessResult};
