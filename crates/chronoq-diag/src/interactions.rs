//! Static qubit-interaction slicing (spec §4.H, `getInteractions`).
//!
//! Target identity is tracked by [`RegisterRef`] rather than a resolved
//! global `QubitId`: instructions inside a gate body reference formal
//! parameter names (`a`, `b`, …) that have no entry in a `RegisterTable`,
//! while top-level instructions reference real `name[index]` pairs. Working
//! directly on the reference as written lets the same closure walk both
//! scopes without a substitution-aware resolver.

use rustc_hash::FxHashSet;

use chronoq_ir::{Instruction, InstructionId, RegisterRef};

use crate::error::{DiagError, DiagResult};

/// Mark every target that co-appears with `qubit` in some instruction's
/// target list, prior to `before` and within `before`'s enclosing scope,
/// iterated to a fixed point. `qubit` is always included in the result.
pub fn get_interactions(
    instructions: &[Instruction],
    before: InstructionId,
    qubit: &RegisterRef,
) -> DiagResult<FxHashSet<RegisterRef>> {
    if before > instructions.len() {
        return Err(DiagError::UnknownInstruction(before));
    }

    let scope = scope_ids(instructions, before);
    let mut reached = FxHashSet::default();
    reached.insert(qubit.clone());

    loop {
        let mut changed = false;
        for &id in &scope {
            let targets = &instructions[id].targets;
            if targets.is_empty() || !targets.iter().any(|t| reached.contains(t)) {
                continue;
            }
            for t in targets {
                if reached.insert(t.clone()) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    Ok(reached)
}

/// Instruction ids at `before`'s own scope level, preceding `before` in
/// source order: either the top-level program, or the body of the gate
/// definition `before` sits inside.
fn scope_ids(instructions: &[Instruction], before: InstructionId) -> Vec<InstructionId> {
    let in_body = instructions
        .get(before)
        .is_some_and(|i| i.in_function_definition);

    if in_body {
        let Some(header) = instructions.iter().find(|i| {
            i.is_function_definition
                && i.block.as_ref().is_some_and(|b| b.contains(&before))
        }) else {
            return Vec::new();
        };
        header
            .block
            .as_ref()
            .map(|body| body.iter().copied().filter(|&id| id < before).collect())
            .unwrap_or_default()
    } else {
        (0..before).filter(|&id| !instructions[id].in_function_definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoq_ir::RegisterRef;
    use chronoq_preprocess::preprocess;

    #[test]
    fn cx_links_control_and_target() {
        let program = preprocess("qreg q[2]; h q[0]; cx q[0], q[1];").unwrap();
        let interactions = get_interactions(&program.instructions, 2, &RegisterRef::new("q", 0)).unwrap();
        assert!(interactions.contains(&RegisterRef::new("q", 1)));
    }

    #[test]
    fn untouched_qubit_only_interacts_with_itself() {
        let program = preprocess("qreg q[3]; h q[0]; cx q[0], q[1];").unwrap();
        let interactions = get_interactions(&program.instructions, 2, &RegisterRef::new("q", 2)).unwrap();
        assert_eq!(interactions.len(), 1);
        assert!(interactions.contains(&RegisterRef::new("q", 2)));
    }

    #[test]
    fn transitive_chain_propagates() {
        let program = preprocess("qreg q[3]; h q[0]; cx q[0], q[1]; cx q[1], q[2];").unwrap();
        let interactions = get_interactions(&program.instructions, 3, &RegisterRef::new("q", 0)).unwrap();
        assert!(interactions.contains(&RegisterRef::new("q", 2)));
    }
}
