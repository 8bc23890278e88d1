//! End-to-end preprocessing of realistic source snippets.

use chronoq_ir::{InstructionKind, RegisterKind, SimOp, Successor};
use chronoq_preprocess::preprocess;

#[test]
fn bell_pair_with_entanglement_assertion() {
    let src = r#"
        qreg q[2];
        creg c[2];
        h q[0];
        cx q[0], q[1];
        assert-ent q[0], q[1];
        measure q[0] -> c[0];
        measure q[1] -> c[1];
    "#;
    let program = preprocess(src).unwrap();
    assert_eq!(program.registers.num_qubits(), 2);
    assert_eq!(program.registers.num_clbits(), 2);

    let kinds: Vec<_> = program.instructions.iter().map(|i| &i.kind).collect();
    assert!(kinds[0] == &InstructionKind::Simulate(SimOp::Gate {
        gate: chronoq_ir::StandardGate::H,
        condition: None,
    }));
    assert!(kinds[2].is_assertion());
    assert!(matches!(kinds[3], InstructionKind::Simulate(SimOp::Measure { .. })));

    // assertion is excluded from the clean source handed to the front end.
    assert!(!program.clean_source.contains("assert-ent"));
    assert!(program.clean_source.contains("measure"));
}

#[test]
fn gate_definition_is_called_twice_with_correct_substitution() {
    let src = r#"
        qreg q[3];
        gate bell(a, b) {
            h a;
            cx a, b;
        }
        bell q[0], q[1];
        bell q[1], q[2];
    "#;
    let program = preprocess(src).unwrap();
    let calls: Vec<_> = program
        .instructions
        .iter()
        .filter(|i| i.is_function_call)
        .collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].call_substitution.get("a").unwrap(), "q[0]");
    assert_eq!(calls[0].call_substitution.get("b").unwrap(), "q[1]");
    assert_eq!(calls[1].call_substitution.get("a").unwrap(), "q[1]");
    assert_eq!(calls[1].call_substitution.get("b").unwrap(), "q[2]");

    let func = program.functions.get("bell").unwrap();
    assert_eq!(program.instructions[func.return_id].successor, Successor::Pop);
    for call in &calls {
        assert_eq!(call.successor, Successor::Next(func.entry_id));
    }
}

#[test]
fn classic_controlled_gate_after_measurement() {
    let src = r#"
        qreg q[2];
        creg c[1];
        h q[0];
        measure q[0] -> c[0];
        if (c==1) x q[1];
    "#;
    let program = preprocess(src).unwrap();
    let conditioned = program
        .instructions
        .iter()
        .find_map(|i| match i.sim_op() {
            Some(SimOp::Gate { condition: Some(cond), .. }) => Some(cond.clone()),
            _ => None,
        })
        .expect("expected a conditioned gate");
    assert_eq!(conditioned.register, "c");
    assert_eq!(conditioned.value, 1);
}

#[test]
fn data_dependencies_track_most_recent_writer_per_target() {
    let src = "qreg q[2]; h q[0]; cx q[0], q[1]; x q[1];";
    let program = preprocess(src).unwrap();
    // cx depends on h's write to q[0]
    assert_eq!(program.instructions[1].data_dependencies, vec![(0, 0)]);
    // x q[1] depends on cx's write to q[1] (second target)
    assert_eq!(program.instructions[2].data_dependencies, vec![(1, 1)]);
}

#[test]
fn comments_do_not_shift_breakpoint_offsets() {
    let src = "qreg q[1]; // one qubit\nh q[0]; // apply hadamard\n";
    let program = preprocess(src).unwrap();
    let gate = &program.instructions[0];
    assert!(src[gate.source_start..gate.source_end].trim_start().starts_with("h q[0]"));
}

#[test]
fn unknown_register_is_rejected() {
    let err = preprocess("h q[0];").unwrap_err();
    assert!(matches!(
        err,
        chronoq_preprocess::PreprocessError::UnknownRegister { .. }
    ));
}

#[test]
fn creg_materializes_classical_variables() {
    let program = preprocess("creg c[3];").unwrap();
    assert_eq!(program.classical_vars.len(), 3);
    assert_eq!(program.classical_vars.name_at(0), Some("c[0]"));
    assert_eq!(program.registers.find("c").unwrap().kind, RegisterKind::Classical);
}
