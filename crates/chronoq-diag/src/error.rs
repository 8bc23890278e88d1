//! Diagnostic-engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiagError {
    #[error("instruction {0} is out of range")]
    UnknownInstruction(usize),
}

pub type DiagResult<T> = Result<T, DiagError>;
