//! Errors raised by a decision-diagram package implementation.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DdError {
    #[error("unknown state handle {0:?}")]
    UnknownState(crate::state::StateId),

    #[error("qubit index {qubit} out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange { qubit: u32, num_qubits: u32 },

    #[error("decRef called on state {0:?} with no outstanding incRef")]
    RefUnderflow(crate::state::StateId),

    #[error("sub-state over the requested qubits is not a legal pure state (purity {purity:.6})")]
    NotAPureSubstate { purity: f64 },

    #[error("state is not normalized (norm^2 = {norm_sq:.6})")]
    NotNormalized { norm_sq: f64 },
}

pub type DdResult<T> = Result<T, DdError>;
