//! Engine errors and the tri-state `Result` the external interface exposes.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("engine has not been initialized with loadCode")]
    NotReady,

    #[error("no previous instruction to step back to")]
    NoPreviousInstruction,

    #[error("call stack is empty")]
    EmptyCallStack,

    #[error(transparent)]
    Preprocess(#[from] chronoq_preprocess::PreprocessError),

    #[error(transparent)]
    Dd(#[from] chronoq_dd::DdError),

    #[error("breakpoint position {0} does not fall inside any instruction")]
    NoInstructionAtPosition(usize),

    #[error("instruction {0} is out of range")]
    UnknownInstruction(usize),

    #[error("classical variable '{0}' is unknown")]
    UnknownClassicalVariable(String),

    #[error("{feature} is not implemented")]
    NotImplemented { feature: &'static str },

    #[error("sub-circuit for a circuit-equality assertion may not itself contain assertions")]
    NestedAssertionInSubCircuit,

    #[error("eigendecomposition failed to find a unit eigenvalue for the reduced state")]
    NoPureSubstate,

    #[error("'{0}' is not a valid binary bitstring")]
    InvalidBitstring(String),

    #[error("no assertion has failed yet")]
    NoFailedAssertion,

    #[error(transparent)]
    Diag(#[from] chronoq_diag::DiagError),
}

pub type EngineResult<T> = Result<T, EngineError>;
