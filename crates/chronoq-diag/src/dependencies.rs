//! Static data-dependency slicing (spec §4.H, `getDataDependencies`).

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use chronoq_ir::{Instruction, InstructionId, Successor};

use crate::error::{DiagError, DiagResult};

/// Mark every instruction transitively reachable from `target` through
/// `Instruction::data_dependencies`, including `target` itself.
///
/// When `include_callers` is set, a dependency chain that dead-ends inside a
/// gate body (no recorded predecessor, because the write happened at some
/// call site rather than inside the body) pulls in every known call site of
/// that gate, letting the slice continue from there.
pub fn data_dependencies(
    instructions: &[Instruction],
    target: InstructionId,
    include_callers: bool,
) -> DiagResult<FxHashSet<InstructionId>> {
    if target >= instructions.len() {
        return Err(DiagError::UnknownInstruction(target));
    }

    let mut marked = FxHashSet::default();
    let mut worklist = VecDeque::new();
    marked.insert(target);
    worklist.push_back(target);

    while let Some(id) = worklist.pop_front() {
        let Some(inst) = instructions.get(id) else {
            continue;
        };

        for &(pred, _) in &inst.data_dependencies {
            if marked.insert(pred) {
                worklist.push_back(pred);
            }
        }

        if include_callers && inst.in_function_definition && inst.data_dependencies.is_empty() {
            for call_id in call_sites_of(instructions, id) {
                if marked.insert(call_id) {
                    worklist.push_back(call_id);
                }
            }
        }
    }

    Ok(marked)
}

/// The header instruction owning `id`, if `id` sits in a gate body.
fn owning_header(instructions: &[Instruction], id: InstructionId) -> Option<InstructionId> {
    instructions.iter().position(|inst| {
        inst.is_function_definition
            && inst
                .block
                .as_ref()
                .is_some_and(|body| body.contains(&id))
    })
}

/// Every `CALL` instruction that jumps into the gate body owning `id`,
/// matched structurally by entry point rather than by name (the instruction
/// list carries no back-reference from a body to its declared gate name).
fn call_sites_of(instructions: &[Instruction], id: InstructionId) -> Vec<InstructionId> {
    let Some(header) = owning_header(instructions, id) else {
        return Vec::new();
    };
    let Some(entry) = instructions[header].block.as_ref().and_then(|b| b.first().copied()) else {
        return Vec::new();
    };
    instructions
        .iter()
        .filter(|inst| inst.is_function_call && inst.successor == Successor::Next(entry))
        .map(|inst| inst.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoq_preprocess::preprocess;

    #[test]
    fn marks_transitive_predecessors() {
        let program = preprocess("qreg q[2]; h q[0]; cx q[0], q[1]; x q[1];").unwrap();
        let deps = data_dependencies(&program.instructions, 2, false).unwrap();
        assert!(deps.contains(&2));
        assert!(deps.contains(&1));
        assert!(!deps.contains(&0));
    }

    #[test]
    fn includes_callers_when_body_dependency_dead_ends() {
        let src = r#"
            qreg q[2];
            gate bell(a, b) {
                h a;
                cx a, b;
            }
            bell q[0], q[1];
        "#;
        let program = preprocess(src).unwrap();
        // `h a` inside the body is a dead end: `a` is a formal parameter
        // with no prior writer inside the body itself.
        let h_in_body = program
            .instructions
            .iter()
            .find(|i| i.in_function_definition && i.kind.is_simulate())
            .unwrap()
            .id;
        let deps = data_dependencies(&program.instructions, h_in_body, true).unwrap();
        let call_id = program
            .instructions
            .iter()
            .find(|i| i.is_function_call)
            .unwrap()
            .id;
        assert!(deps.contains(&call_id));
    }

    #[test]
    fn unknown_instruction_is_rejected() {
        let program = preprocess("qreg q[1]; h q[0];").unwrap();
        assert!(data_dependencies(&program.instructions, 99, false).is_err());
    }
}
