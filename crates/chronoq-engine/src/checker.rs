//! Assertion verdicts (spec §4.G): turns a parsed [`Assertion`] plus the
//! engine's live state into a pass/fail boolean.
//!
//! Dispatch is a single `match` over the assertion enum rather than the
//! original's polymorphic `checkAssertion` hierarchy (spec §9,
//! "Polymorphic assertions").

use num_complex::Complex64;
use rustc_hash::FxHashSet;

use chronoq_dd::DecisionDiagramPackage;
use chronoq_ir::{Assertion, QubitId};

use crate::density;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};

/// Entanglement is numerically ambiguous right at the boundary; two states
/// whose mutual information differs by less than this are both "basically
/// zero" or both "basically maximal".
const ENTANGLEMENT_EPSILON: f64 = 1e-4;

/// An amplitude below this magnitude is treated as numerical noise, not an
/// occupied basis outcome, for the superposition check.
const SUPERPOSITION_EPSILON: f64 = 1e-8;

pub fn check<P: DecisionDiagramPackage>(engine: &Engine<P>, assertion: &Assertion) -> EngineResult<bool> {
    match assertion {
        Assertion::Entanglement { .. } => check_entanglement(engine, assertion),
        Assertion::Superposition { .. } => check_superposition(engine, assertion),
        Assertion::StatevectorEquality {
            similarity_threshold,
            expected,
            ..
        } => check_statevector_equality(engine, assertion, *similarity_threshold, &expected.0),
        Assertion::CircuitEquality {
            similarity_threshold,
            circuit_code,
            ..
        } => check_circuit_equality(engine, assertion, *similarity_threshold, circuit_code),
        Assertion::Span { .. } => Err(EngineError::NotImplemented { feature: "assert-span" }),
    }
}

fn check_entanglement<P: DecisionDiagramPackage>(engine: &Engine<P>, assertion: &Assertion) -> EngineResult<bool> {
    let targets = engine.resolve_targets(assertion.targets())?;
    if targets.len() < 2 {
        return Ok(false);
    }
    let psi = engine.get_state_vector_full()?;
    let n = engine.num_qubits() as usize;

    for i in 0..targets.len() {
        for j in (i + 1)..targets.len() {
            if mutual_information(&psi, n, targets[i], targets[j])? <= ENTANGLEMENT_EPSILON {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn mutual_information(psi: &[Complex64], num_qubits: usize, a: QubitId, b: QubitId) -> EngineResult<f64> {
    let s_a = subsystem_entropy(psi, num_qubits, &[a.index()])?;
    let s_b = subsystem_entropy(psi, num_qubits, &[b.index()])?;
    let s_ab = subsystem_entropy(psi, num_qubits, &[a.index(), b.index()])?;
    Ok(s_a + s_b - s_ab)
}

fn subsystem_entropy(psi: &[Complex64], num_qubits: usize, keep: &[usize]) -> EngineResult<f64> {
    let rho = density::reduced_density_matrix(psi, num_qubits, keep);
    let (mut values, _) = density::hermitian_eigen(&rho);
    if !density::clamp_eigenvalues(&mut values) {
        return Err(EngineError::NoPureSubstate);
    }
    Ok(density::von_neumann_entropy(&values))
}

fn check_superposition<P: DecisionDiagramPackage>(engine: &Engine<P>, assertion: &Assertion) -> EngineResult<bool> {
    let targets = engine.resolve_targets(assertion.targets())?;
    let psi = engine.get_state_vector_full()?;

    let mut projections = FxHashSet::default();
    for (index, amp) in psi.iter().enumerate() {
        if amp.norm() <= SUPERPOSITION_EPSILON {
            continue;
        }
        let mut projection = 0usize;
        for (bit, qubit) in targets.iter().enumerate() {
            if (index >> qubit.index()) & 1 == 1 {
                projection |= 1 << bit;
            }
        }
        projections.insert(projection);
    }
    Ok(projections.len() >= 2)
}

fn check_statevector_equality<P: DecisionDiagramPackage>(
    engine: &Engine<P>,
    assertion: &Assertion,
    similarity_threshold: f64,
    expected: &[Complex64],
) -> EngineResult<bool> {
    let targets = engine.resolve_targets(assertion.targets())?;
    let actual = engine.get_state_vector_sub(&targets)?;
    if actual.len() != expected.len() {
        return Err(EngineError::NoPureSubstate);
    }
    Ok(fidelity(&actual, expected) >= similarity_threshold)
}

fn check_circuit_equality<P: DecisionDiagramPackage>(
    engine: &Engine<P>,
    assertion: &Assertion,
    similarity_threshold: f64,
    circuit_code: &str,
) -> EngineResult<bool> {
    let targets = engine.resolve_targets(assertion.targets())?;
    let actual = engine.get_state_vector_sub(&targets)?;

    let sub_program = chronoq_preprocess::preprocess(circuit_code)?;
    if sub_program.instructions.iter().any(|i| i.kind.is_assertion()) {
        return Err(EngineError::NestedAssertionInSubCircuit);
    }

    let package = chronoq_adapter_statevector::StatevectorPackage::new();
    let mut sub_engine = Engine::new(package);
    sub_engine.load_code(circuit_code)?;
    sub_engine.run_all()?;
    let expected = sub_engine.get_state_vector_full()?;

    if actual.len() != expected.len() {
        return Err(EngineError::NoPureSubstate);
    }
    Ok(fidelity(&actual, &expected) >= similarity_threshold)
}

/// `|<expected|actual>|`.
fn fidelity(actual: &[Complex64], expected: &[Complex64]) -> f64 {
    let overlap: Complex64 = actual
        .iter()
        .zip(expected.iter())
        .map(|(a, e)| e.conj() * a)
        .sum();
    overlap.norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoq_adapter_statevector::StatevectorPackage;

    fn bell_engine() -> Engine<StatevectorPackage> {
        let mut engine = Engine::new(StatevectorPackage::new());
        engine.load_code("qreg q[2]; h q[0]; cx q[0],q[1];").unwrap();
        engine.run_all().unwrap();
        engine
    }

    #[test]
    fn bell_pair_qubits_are_entangled() {
        let engine = bell_engine();
        let n = engine.num_qubits() as usize;
        let psi = engine.get_state_vector_full().unwrap();
        let mi = mutual_information(&psi, n, QubitId(0), QubitId(1)).unwrap();
        assert!(mi > ENTANGLEMENT_EPSILON);
    }

    #[test]
    fn product_state_qubits_are_not_entangled() {
        let mut engine = Engine::new(StatevectorPackage::new());
        engine.load_code("qreg q[2]; h q[0];").unwrap();
        engine.run_all().unwrap();
        let n = engine.num_qubits() as usize;
        let psi = engine.get_state_vector_full().unwrap();
        let mi = mutual_information(&psi, n, QubitId(0), QubitId(1)).unwrap();
        assert!(mi < ENTANGLEMENT_EPSILON);
    }

    #[test]
    fn single_qubit_in_superposition_is_detected() {
        let mut engine = Engine::new(StatevectorPackage::new());
        engine.load_code("qreg q[1]; h q[0];").unwrap();
        engine.run_all().unwrap();
        let assertion = Assertion::Superposition {
            targets: vec![chronoq_ir::RegisterRef::new("q", 0)],
        };
        assert!(check(&engine, &assertion).unwrap());
    }

    #[test]
    fn definite_basis_state_is_not_superposed() {
        let mut engine = Engine::new(StatevectorPackage::new());
        engine.load_code("qreg q[1]; x q[0];").unwrap();
        engine.run_all().unwrap();
        let assertion = Assertion::Superposition {
            targets: vec![chronoq_ir::RegisterRef::new("q", 0)],
        };
        assert!(!check(&engine, &assertion).unwrap());
    }
}
