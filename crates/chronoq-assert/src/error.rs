//! Error types for assertion parsing.

use thiserror::Error;

/// Errors that can occur while parsing a single `assert-*` statement.
///
/// Every variant carries the source line number, matching spec §4.A
/// ("Parse errors carry a line number and surface as `ParsingError`").
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParsingError {
    #[error("line {line}: unknown assertion keyword '{keyword}'")]
    UnknownKeyword { line: usize, keyword: String },

    #[error("line {line}: malformed assertion: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: similarity threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange { line: usize, value: f64 },

    #[error(
        "line {line}: expected a state vector of length {expected} (2^{targets} targets), got {got}"
    )]
    StatevectorLengthMismatch {
        line: usize,
        expected: usize,
        targets: usize,
        got: usize,
    },

    #[error("line {line}: target '{target}' is empty")]
    EmptyTarget { line: usize, target: String },

    #[error("line {line}: register '{register}' is not declared")]
    UnknownRegister { line: usize, register: String },

    #[error(
        "line {line}: index {index} out of bounds for register '{register}' of size {size}"
    )]
    IndexOutOfBounds {
        line: usize,
        register: String,
        index: u32,
        size: u32,
    },
}

pub type ParseResult<T> = Result<T, ParsingError>;
