//! End-to-end debugger scenarios: stepping, assertions, and the
//! pause/rewind behavior they trigger.

use chronoq_adapter_statevector::StatevectorPackage;
use chronoq_engine::{Engine, StepOutcome};

fn engine() -> Engine<StatevectorPackage> {
    Engine::new(StatevectorPackage::new())
}

#[test]
fn bell_pair_entanglement_assertion_passes() {
    let mut e = engine();
    e.load_code("qreg q[2]; h q[0]; cx q[0], q[1]; assert-ent q[0], q[1];")
        .unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(e.did_assertion_fail().is_none());
}

#[test]
fn missed_entanglement_assertion_fails_and_rewinds() {
    let mut e = engine();
    e.load_code("qreg q[2]; h q[0]; assert-ent q[0], q[1];")
        .unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Paused);
    let failed_at = e.did_assertion_fail().expect("assertion should have failed");
    // stepped back to just before the assertion, not past it
    assert_eq!(e.get_stack_trace(), vec![failed_at]);
    assert!(e.get_instruction_position(failed_at).is_ok());
}

#[test]
fn superposition_assertion_on_single_qubit() {
    let mut e = engine();
    e.load_code("qreg q[1]; h q[0]; assert-sup q[0];").unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(e.did_assertion_fail().is_none());
}

#[test]
fn definite_state_fails_superposition_assertion() {
    let mut e = engine();
    e.load_code("qreg q[1]; x q[0]; assert-sup q[0];").unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Paused);
    assert!(e.did_assertion_fail().is_some());
}

#[test]
fn statevector_equality_assertion_against_plus_state() {
    let mut e = engine();
    e.load_code("qreg q[1]; h q[0]; assert-eq 0.99 q[0] {0.7071+0i, 0.7071+0i};")
        .unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(e.did_assertion_fail().is_none());
}

#[test]
fn circuit_equality_assertion_against_equivalent_bell_circuit() {
    let mut e = engine();
    e.load_code(
        "qreg q[2]; h q[0]; cx q[0], q[1]; assert-eq 0.99 q[0], q[1] {h q[0]; cx q[0], q[1];};",
    )
    .unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(e.did_assertion_fail().is_none());
}

#[test]
fn forward_then_backward_step_restores_amplitude() {
    let mut e = engine();
    e.load_code("qreg q[1]; h q[0];").unwrap();
    let before = e.get_amplitude_index(0).unwrap();
    e.step_forward().unwrap();
    let after = e.get_amplitude_index(0).unwrap();
    assert!((after.norm() - before.norm()).abs() > 1e-6);
    e.step_backward().unwrap();
    let restored = e.get_amplitude_index(0).unwrap();
    assert!((restored - before).norm() < 1e-9);
}

#[test]
fn measurement_blocks_backward_stepping() {
    let mut e = engine();
    e.load_code("qreg q[1]; creg c[1]; x q[0]; measure q[0] -> c[0];")
        .unwrap();
    e.step_forward().unwrap();
    e.step_forward().unwrap();
    let err = e.step_backward().unwrap_err();
    assert!(matches!(err, chronoq_engine::EngineError::NoPreviousInstruction));
}

#[test]
fn reset_simulation_returns_to_initial_state_and_keeps_breakpoints() {
    let mut e = engine();
    e.load_code("qreg q[1]; h q[0]; x q[0];").unwrap();
    e.set_breakpoint(1);
    e.step_forward().unwrap();
    e.step_forward().unwrap();
    e.reset_simulation().unwrap();
    assert!(e.get_instruction_position(1).is_ok());
    let outcome = e.run_simulation().unwrap();
    assert_eq!(outcome, StepOutcome::Paused);
    assert_eq!(e.was_breakpoint_hit(), Some(1));
}

#[test]
fn function_call_and_return_preserve_stack_discipline() {
    let mut e = engine();
    e.load_code(
        r#"
        qreg q[2];
        gate bell(a, b) {
            h a;
            cx a, b;
        }
        bell q[0], q[1];
        "#,
    )
    .unwrap();
    let outcome = e.run_all().unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert_eq!(e.get_stack_depth(), 1);
}
