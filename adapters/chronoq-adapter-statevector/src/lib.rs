//! Default, always-available [`DecisionDiagramPackage`] implementation,
//! backed by a dense `Vec<Complex64>` statevector rather than an actual
//! decision diagram.
//!
//! Gate operators are not materialized as matrices: `get_dd`/`get_inverse_dd`
//! record which gate to apply and to which qubits, and `multiply` performs
//! the bit-masked in-place update directly on a cloned copy of the target
//! vector state (`gates.rs`).

mod gates;

use rustc_hash::FxHashMap;
use tracing::trace;

use chronoq_dd::{DdError, DdResult, DecisionDiagramPackage, RefTracker, StateId};
use chronoq_ir::{QubitId, StandardGate};
use num_complex::Complex64;

#[derive(Debug, Clone)]
enum Stored {
    Vector { amplitudes: Vec<Complex64>, num_qubits: u32 },
    Operator { gate: StandardGate, targets: Vec<QubitId>, num_qubits: u32 },
    Identity { num_qubits: u32 },
}

/// A [`DecisionDiagramPackage`] whose "decision diagrams" are plain dense
/// statevectors. Good up to a few dozen qubits; trades the memory and
/// canonicalization benefits of a real DD for a much smaller implementation
/// surface, which is the right trade for a debugger whose programs are
/// small, hand-written test circuits rather than production-scale ones.
#[derive(Debug, Default)]
pub struct StatevectorPackage {
    storage: FxHashMap<StateId, Stored>,
    refs: RefTracker,
    next_id: u64,
}

impl StatevectorPackage {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, entry: Stored) -> StateId {
        let id = StateId(self.next_id);
        self.next_id += 1;
        self.storage.insert(id, entry);
        self.refs.track(id);
        id
    }

    fn vector(&self, id: StateId) -> DdResult<(&[Complex64], u32)> {
        match self.storage.get(&id) {
            Some(Stored::Vector { amplitudes, num_qubits }) => Ok((amplitudes, *num_qubits)),
            _ => Err(DdError::UnknownState(id)),
        }
    }
}

impl DecisionDiagramPackage for StatevectorPackage {
    fn make_zero_state(&mut self, num_qubits: u32) -> StateId {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        self.alloc(Stored::Vector { amplitudes, num_qubits })
    }

    fn make_ident(&mut self, num_qubits: u32) -> StateId {
        self.alloc(Stored::Identity { num_qubits })
    }

    fn get_dd(&mut self, gate: &StandardGate, targets: &[QubitId], num_qubits: u32) -> StateId {
        self.alloc(Stored::Operator {
            gate: gate.clone(),
            targets: targets.to_vec(),
            num_qubits,
        })
    }

    fn get_inverse_dd(&mut self, gate: &StandardGate, targets: &[QubitId], num_qubits: u32) -> StateId {
        self.alloc(Stored::Operator {
            gate: gates::adjoint(gate),
            targets: targets.to_vec(),
            num_qubits,
        })
    }

    fn multiply(&mut self, operator: StateId, state: StateId) -> DdResult<StateId> {
        let op = self.storage.get(&operator).ok_or(DdError::UnknownState(operator))?.clone();
        let (amplitudes, num_qubits) = self.vector(state)?;
        let mut amplitudes = amplitudes.to_vec();
        let num_qubits = num_qubits;

        match op {
            Stored::Identity { .. } => {}
            Stored::Operator { gate, targets, .. } => {
                gates::apply(&mut amplitudes, num_qubits, &gate, &targets);
            }
            Stored::Vector { .. } => return Err(DdError::UnknownState(operator)),
        }

        trace!(?operator, ?state, "multiplied operator into state");
        Ok(self.alloc(Stored::Vector { amplitudes, num_qubits }))
    }

    fn inc_ref(&mut self, state: StateId) {
        self.refs.inc_ref(state);
    }

    fn dec_ref(&mut self, state: StateId) -> DdResult<()> {
        self.refs.dec_ref(state)
    }

    fn garbage_collect(&mut self) {
        for id in self.refs.collect_garbage() {
            self.storage.remove(&id);
        }
    }

    fn determine_measurement_probabilities(&self, state: StateId, qubit: QubitId) -> DdResult<(f64, f64)> {
        let (amplitudes, num_qubits) = self.vector(state)?;
        if qubit.index() as u32 >= num_qubits {
            return Err(DdError::QubitOutOfRange { qubit: qubit.0, num_qubits });
        }
        let mask = 1usize << qubit.index();
        let mut p0 = 0.0;
        let mut p1 = 0.0;
        for (i, amp) in amplitudes.iter().enumerate() {
            if i & mask == 0 {
                p0 += amp.norm_sqr();
            } else {
                p1 += amp.norm_sqr();
            }
        }
        Ok((p0, p1))
    }

    fn perform_collapsing_measurement(&mut self, state: StateId, qubit: QubitId, outcome: bool) -> DdResult<StateId> {
        let (amplitudes, num_qubits) = self.vector(state)?;
        let mask = 1usize << qubit.index();
        let keep_bit = if outcome { mask } else { 0 };

        let mut collapsed = amplitudes.to_vec();
        let mut norm_sq = 0.0;
        for (i, amp) in collapsed.iter_mut().enumerate() {
            if i & mask != keep_bit {
                *amp = Complex64::new(0.0, 0.0);
            } else {
                norm_sq += amp.norm_sqr();
            }
        }
        if norm_sq <= 0.0 {
            return Err(DdError::NotNormalized { norm_sq });
        }
        let norm = norm_sq.sqrt();
        for amp in &mut collapsed {
            *amp /= norm;
        }
        Ok(self.alloc(Stored::Vector { amplitudes: collapsed, num_qubits }))
    }

    fn amplitude(&self, state: StateId, index: usize) -> DdResult<Complex64> {
        let (amplitudes, _) = self.vector(state)?;
        amplitudes
            .get(index)
            .copied()
            .ok_or(DdError::UnknownState(state))
    }

    fn num_qubits_of(&self, state: StateId) -> DdResult<u32> {
        self.vector(state).map(|(_, n)| n)
    }

    fn full_statevector(&self, state: StateId) -> DdResult<Vec<Complex64>> {
        self.vector(state).map(|(amps, _)| amps.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn zero_state_has_unit_amplitude_on_all_zeros() {
        let mut pkg = StatevectorPackage::new();
        let psi = pkg.make_zero_state(2);
        assert!(approx_eq(pkg.amplitude(psi, 0).unwrap(), Complex64::new(1.0, 0.0)));
        assert!(approx_eq(pkg.amplitude(psi, 1).unwrap(), Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn bell_state_via_multiply_matches_expected_amplitudes() {
        let mut pkg = StatevectorPackage::new();
        let psi0 = pkg.make_zero_state(2);
        pkg.inc_ref(psi0);

        let h = pkg.get_dd(&StandardGate::H, &[QubitId(0)], 2);
        let psi1 = pkg.multiply(h, psi0).unwrap();
        pkg.inc_ref(psi1);
        pkg.dec_ref(psi0).unwrap();
        pkg.garbage_collect();

        let cx = pkg.get_dd(&StandardGate::CX, &[QubitId(0), QubitId(1)], 2);
        let psi2 = pkg.multiply(cx, psi1).unwrap();
        pkg.inc_ref(psi2);
        pkg.dec_ref(psi1).unwrap();
        pkg.garbage_collect();

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(pkg.amplitude(psi2, 0).unwrap(), Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(pkg.amplitude(psi2, 1).unwrap(), Complex64::new(0.0, 0.0)));
        assert!(approx_eq(pkg.amplitude(psi2, 2).unwrap(), Complex64::new(0.0, 0.0)));
        assert!(approx_eq(pkg.amplitude(psi2, 3).unwrap(), Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn measuring_definite_one_state_always_collapses_to_one() {
        let mut pkg = StatevectorPackage::new();
        let psi0 = pkg.make_zero_state(1);
        pkg.inc_ref(psi0);
        let x = pkg.get_dd(&StandardGate::X, &[QubitId(0)], 1);
        let psi1 = pkg.multiply(x, psi0).unwrap();

        let (p0, p1) = pkg.determine_measurement_probabilities(psi1, QubitId(0)).unwrap();
        assert!(p0 < 1e-9);
        assert!((p1 - 1.0).abs() < 1e-9);

        let collapsed = pkg.perform_collapsing_measurement(psi1, QubitId(0), true).unwrap();
        assert!(approx_eq(pkg.amplitude(collapsed, 1).unwrap(), Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn dec_ref_without_matching_inc_ref_errors() {
        let mut pkg = StatevectorPackage::new();
        let psi = pkg.make_zero_state(1);
        assert!(matches!(pkg.dec_ref(psi), Err(DdError::RefUnderflow(_))));
    }

    #[test]
    fn inverse_gate_undoes_forward_application() {
        let mut pkg = StatevectorPackage::new();
        let psi0 = pkg.make_zero_state(1);
        let h = pkg.get_dd(&StandardGate::H, &[QubitId(0)], 1);
        let psi1 = pkg.multiply(h, psi0).unwrap();
        let h_inv = pkg.get_inverse_dd(&StandardGate::H, &[QubitId(0)], 1);
        let psi2 = pkg.multiply(h_inv, psi1).unwrap();
        assert!(approx_eq(pkg.amplitude(psi2, 0).unwrap(), Complex64::new(1.0, 0.0)));
        assert!(approx_eq(pkg.amplitude(psi2, 1).unwrap(), Complex64::new(0.0, 0.0)));
    }
}
