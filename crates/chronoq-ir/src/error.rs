//! Error types for the IR crate.

use thiserror::Error;

use crate::qubit::{ClbitId, QubitId};

/// Errors that can occur manipulating the instruction/register data model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    #[error("qubit {0:?} is out of range for this circuit")]
    QubitOutOfRange(QubitId),

    #[error("classical bit {0:?} is out of range for this circuit")]
    ClbitOutOfRange(ClbitId),

    #[error("register '{0}' is not declared")]
    UnknownRegister(String),

    #[error("index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: u32,
        size: u32,
    },

    #[error("instruction id {0} is out of range")]
    InvalidInstructionId(usize),
}

pub type IrResult<T> = Result<T, IrError>;
