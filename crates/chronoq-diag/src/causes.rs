//! `potentialErrorCauses` (spec §4.H): combines a runtime zero-control scan
//! with a static missing-interaction scan, up to a requested count.

use rustc_hash::FxHashSet;
use tracing::debug;

use chronoq_ir::{Assertion, InstructionId, QubitId, RegisterRef};

use crate::error::DiagResult;
use crate::interactions::get_interactions;

/// A single plausible explanation for why an assertion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCause {
    /// `instruction` is a controlled gate whose control has only ever been
    /// observed at `|0>` so far — it may simply never have fired.
    ZeroControl {
        instruction: InstructionId,
        control: QubitId,
    },
    /// Static analysis found no path connecting `qubits.0` and `qubits.1`
    /// before `instruction`, even though the failed assertion expected them
    /// to interact.
    MissingInteraction {
        instruction: InstructionId,
        qubits: (RegisterRef, RegisterRef),
    },
}

/// Instructions `i` where `zeroControls[i] ≠ ∅ ∧ nonZeroControls[i] = ∅`
/// (spec §4.H, `getZeroControlInstructions`).
pub fn zero_control_instructions(
    zero_controls: impl Iterator<Item = (InstructionId, FxHashSet<QubitId>)>,
    non_zero_controls: &rustc_hash::FxHashMap<InstructionId, FxHashSet<QubitId>>,
) -> Vec<InstructionId> {
    zero_controls
        .filter(|(id, qubits)| {
            !qubits.is_empty()
                && non_zero_controls.get(id).map(FxHashSet::is_empty).unwrap_or(true)
        })
        .map(|(id, _)| id)
        .collect()
}

fn zero_control_causes(
    zero_controls: &rustc_hash::FxHashMap<InstructionId, FxHashSet<QubitId>>,
    non_zero_controls: &rustc_hash::FxHashMap<InstructionId, FxHashSet<QubitId>>,
    before: InstructionId,
) -> Vec<ErrorCause> {
    zero_controls
        .iter()
        .filter(|(&id, qubits)| {
            id < before
                && !qubits.is_empty()
                && non_zero_controls.get(&id).map(FxHashSet::is_empty).unwrap_or(true)
        })
        .flat_map(|(&id, qubits)| {
            qubits.iter().map(move |&control| ErrorCause::ZeroControl {
                instruction: id,
                control,
            })
        })
        .collect()
}

fn missing_interaction_causes(
    instructions: &[chronoq_ir::Instruction],
    failed_assertion: &Assertion,
    before: InstructionId,
) -> DiagResult<Vec<ErrorCause>> {
    let targets = failed_assertion.targets();
    let mut causes = Vec::new();
    for i in 0..targets.len() {
        for j in (i + 1)..targets.len() {
            let reached = get_interactions(instructions, before, &targets[i])?;
            if !reached.contains(&targets[j]) {
                causes.push(ErrorCause::MissingInteraction {
                    instruction: before,
                    qubits: (targets[i].clone(), targets[j].clone()),
                });
            }
        }
    }
    Ok(causes)
}

/// Combine zero-control and missing-interaction causes until `count` are
/// produced (spec §4.H, `potentialErrorCauses`).
pub fn potential_error_causes(
    instructions: &[chronoq_ir::Instruction],
    zero_controls: &rustc_hash::FxHashMap<InstructionId, FxHashSet<QubitId>>,
    non_zero_controls: &rustc_hash::FxHashMap<InstructionId, FxHashSet<QubitId>>,
    before: InstructionId,
    failed_assertion: &Assertion,
    count: usize,
) -> DiagResult<Vec<ErrorCause>> {
    let mut causes = zero_control_causes(zero_controls, non_zero_controls, before);
    causes.extend(missing_interaction_causes(instructions, failed_assertion, before)?);
    causes.truncate(count);
    if !causes.is_empty() {
        debug!(found = causes.len(), "potential error causes for failed assertion");
    }
    Ok(causes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn zero_control_without_nonzero_observation_is_reported() {
        let mut zero: FxHashMap<InstructionId, FxHashSet<QubitId>> = FxHashMap::default();
        zero.entry(3).or_default().insert(QubitId(0));
        let non_zero: FxHashMap<InstructionId, FxHashSet<QubitId>> = FxHashMap::default();

        let causes = zero_control_causes(&zero, &non_zero, 10);
        assert_eq!(causes.len(), 1);
        assert!(matches!(causes[0], ErrorCause::ZeroControl { instruction: 3, control: QubitId(0) }));
    }

    #[test]
    fn zero_control_after_before_cutoff_is_excluded() {
        let mut zero: FxHashMap<InstructionId, FxHashSet<QubitId>> = FxHashMap::default();
        zero.entry(9).or_default().insert(QubitId(1));
        let non_zero: FxHashMap<InstructionId, FxHashSet<QubitId>> = FxHashMap::default();

        assert!(zero_control_causes(&zero, &non_zero, 3).is_empty());
    }

    #[test]
    fn missing_interaction_detected_for_unentangled_targets() {
        use chronoq_preprocess::preprocess;

        let program = preprocess("qreg q[3]; h q[0]; cx q[0], q[1];").unwrap();
        let assertion = Assertion::Entanglement {
            targets: vec![RegisterRef::new("q", 0), RegisterRef::new("q", 2)],
        };
        let causes = missing_interaction_causes(&program.instructions, &assertion, 2).unwrap();
        assert_eq!(causes.len(), 1);
    }
}
