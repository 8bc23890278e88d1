//! Errors raised while turning source text into an instruction list.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreprocessError {
    #[error("line {line}: register '{register}' is not declared")]
    UnknownRegister { line: usize, register: String },

    #[error("line {line}: index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        line: usize,
        register: String,
        index: u32,
        size: u32,
    },

    #[error("line {line}: '{register}' is already declared")]
    DuplicateRegister { line: usize, register: String },

    #[error("line {line}: unknown gate or register '{name}'")]
    UnknownGate { line: usize, name: String },

    #[error("line {line}: gate '{gate}' is already defined")]
    DuplicateGateDefinition { line: usize, gate: String },

    #[error("line {line}: gate '{gate}' called with {got} argument(s), expected {expected}")]
    ArityMismatch {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: unknown classical variable '{name}'")]
    UnknownClassicalVariable { line: usize, name: String },

    #[error("line {line}: malformed statement: {message}")]
    Malformed { line: usize, message: String },

    #[error(transparent)]
    Assertion(#[from] chronoq_assert::ParsingError),
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;
