//! The decision-diagram-package contract (spec §4.C/§4.F).
//!
//! The engine never builds gate matrices or manipulates amplitudes directly;
//! every state transition goes through a `DecisionDiagramPackage`. This
//! mirrors the original system's separation between the stepper and its DD
//! backend closely enough that swapping `chronoq-adapter-statevector` for an
//! actual decision-diagram implementation would require no change above this
//! trait.

use num_complex::Complex64;

use chronoq_ir::{QubitId, StandardGate};

use crate::error::DdResult;
use crate::state::StateId;

pub trait DecisionDiagramPackage {
    /// Allocate the all-zero computational basis state `|0...0⟩`.
    fn make_zero_state(&mut self, num_qubits: u32) -> StateId;

    /// Allocate the identity operator over `num_qubits` — used when a
    /// classically-controlled gate's condition evaluates false.
    fn make_ident(&mut self, num_qubits: u32) -> StateId;

    /// Build the operator DD for a gate acting on `targets`.
    fn get_dd(&mut self, gate: &StandardGate, targets: &[QubitId], num_qubits: u32) -> StateId;

    /// Build the operator DD for a gate's inverse, for backward stepping.
    fn get_inverse_dd(
        &mut self,
        gate: &StandardGate,
        targets: &[QubitId],
        num_qubits: u32,
    ) -> StateId;

    /// `temp = operator * state`. Does not touch either operand's refcount;
    /// callers follow an explicit `incRef(temp); decRef(state)` sequence.
    fn multiply(&mut self, operator: StateId, state: StateId) -> DdResult<StateId>;

    fn inc_ref(&mut self, state: StateId);
    fn dec_ref(&mut self, state: StateId) -> DdResult<()>;

    /// Free every state with no outstanding reference.
    fn garbage_collect(&mut self);

    /// `(p0, p1)` — probability of measuring `qubit` as 0 or 1.
    fn determine_measurement_probabilities(
        &self,
        state: StateId,
        qubit: QubitId,
    ) -> DdResult<(f64, f64)>;

    /// Collapse `state` onto the given outcome for `qubit` and renormalize.
    fn perform_collapsing_measurement(
        &mut self,
        state: StateId,
        qubit: QubitId,
        outcome: bool,
    ) -> DdResult<StateId>;

    fn amplitude(&self, state: StateId, index: usize) -> DdResult<Complex64>;

    fn num_qubits_of(&self, state: StateId) -> DdResult<u32>;

    /// Materialize the full `2^n`-entry statevector (spec §4.F,
    /// `getStateVectorFull`).
    fn full_statevector(&self, state: StateId) -> DdResult<Vec<Complex64>>;
}
