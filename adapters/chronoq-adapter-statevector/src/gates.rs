//! Dense-statevector gate application.
//!
//! One function per gate family, applied in place over a flat amplitude
//! vector indexed by computational basis state — the same bit-masking style
//! as every statevector simulator in the corpus, generalized from one fixed
//! qubit count to an explicit `num_qubits` so it can run on arbitrary
//! reduced circuits (e.g. the sub-circuit spun up for `CircuitEquality`).

use std::f64::consts::PI;

use num_complex::Complex64;

use chronoq_ir::{QubitId, StandardGate};

pub fn apply(amplitudes: &mut [Complex64], num_qubits: u32, gate: &StandardGate, targets: &[QubitId]) {
    let q: Vec<usize> = targets.iter().map(|t| t.index()).collect();
    match gate {
        StandardGate::I => {}
        StandardGate::X => apply_x(amplitudes, num_qubits, q[0]),
        StandardGate::Y => apply_y(amplitudes, num_qubits, q[0]),
        StandardGate::Z => apply_z(amplitudes, num_qubits, q[0]),
        StandardGate::H => apply_h(amplitudes, num_qubits, q[0]),
        StandardGate::S => apply_phase(amplitudes, num_qubits, q[0], PI / 2.0),
        StandardGate::Sdg => apply_phase(amplitudes, num_qubits, q[0], -PI / 2.0),
        StandardGate::T => apply_phase(amplitudes, num_qubits, q[0], PI / 4.0),
        StandardGate::Tdg => apply_phase(amplitudes, num_qubits, q[0], -PI / 4.0),
        StandardGate::Rx(theta) => apply_rx(amplitudes, num_qubits, q[0], *theta),
        StandardGate::Ry(theta) => apply_ry(amplitudes, num_qubits, q[0], *theta),
        StandardGate::Rz(theta) => apply_rz(amplitudes, num_qubits, q[0], *theta),
        StandardGate::P(theta) => apply_phase(amplitudes, num_qubits, q[0], *theta),
        StandardGate::U(theta, phi, lambda) => apply_u(amplitudes, num_qubits, q[0], *theta, *phi, *lambda),
        StandardGate::CX => apply_cx(amplitudes, num_qubits, q[0], q[1]),
        StandardGate::CY => apply_cy(amplitudes, num_qubits, q[0], q[1]),
        StandardGate::CZ => apply_cz(amplitudes, num_qubits, q[0], q[1]),
        StandardGate::Swap => apply_swap(amplitudes, num_qubits, q[0], q[1]),
        StandardGate::CRz(theta) => apply_crz(amplitudes, num_qubits, q[0], q[1], *theta),
        StandardGate::CP(theta) => apply_cp(amplitudes, num_qubits, q[0], q[1], *theta),
        StandardGate::CCX => apply_ccx(amplitudes, num_qubits, q[0], q[1], q[2]),
        StandardGate::CSwap => apply_cswap(amplitudes, num_qubits, q[0], q[1], q[2]),
    }
}

/// The adjoint gate: applying `adjoint(g)` undoes `g`.
pub fn adjoint(gate: &StandardGate) -> StandardGate {
    match gate {
        StandardGate::S => StandardGate::Sdg,
        StandardGate::Sdg => StandardGate::S,
        StandardGate::T => StandardGate::Tdg,
        StandardGate::Tdg => StandardGate::T,
        StandardGate::Rx(t) => StandardGate::Rx(-t),
        StandardGate::Ry(t) => StandardGate::Ry(-t),
        StandardGate::Rz(t) => StandardGate::Rz(-t),
        StandardGate::P(t) => StandardGate::P(-t),
        StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
        StandardGate::CRz(t) => StandardGate::CRz(-t),
        StandardGate::CP(t) => StandardGate::CP(-t),
        // Self-inverse: I, X, Y, Z, H, CX, CY, CZ, Swap, CCX, CSwap.
        other => other.clone(),
    }
}

fn size(num_qubits: u32) -> usize {
    1usize << num_qubits
}

fn apply_x(amps: &mut [Complex64], num_qubits: u32, qubit: usize) {
    let mask = 1 << qubit;
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            amps.swap(i, i | mask);
        }
    }
}

fn apply_y(amps: &mut [Complex64], num_qubits: u32, qubit: usize) {
    let mask = 1 << qubit;
    let i_val = Complex64::new(0.0, 1.0);
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            let j = i | mask;
            let tmp = amps[i];
            amps[i] = -i_val * amps[j];
            amps[j] = i_val * tmp;
        }
    }
}

fn apply_z(amps: &mut [Complex64], num_qubits: u32, qubit: usize) {
    let mask = 1 << qubit;
    for i in 0..size(num_qubits) {
        if i & mask != 0 {
            amps[i] = -amps[i];
        }
    }
}

fn apply_h(amps: &mut [Complex64], num_qubits: u32, qubit: usize) {
    let mask = 1 << qubit;
    let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            let j = i | mask;
            let a = amps[i];
            let b = amps[j];
            amps[i] = sqrt2_inv * (a + b);
            amps[j] = sqrt2_inv * (a - b);
        }
    }
}

fn apply_phase(amps: &mut [Complex64], num_qubits: u32, qubit: usize, theta: f64) {
    let mask = 1 << qubit;
    let phase = Complex64::from_polar(1.0, theta);
    for i in 0..size(num_qubits) {
        if i & mask != 0 {
            amps[i] *= phase;
        }
    }
}

fn apply_rx(amps: &mut [Complex64], num_qubits: u32, qubit: usize, theta: f64) {
    let mask = 1 << qubit;
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let neg_i_s = Complex64::new(0.0, -s);
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            let j = i | mask;
            let a = amps[i];
            let b = amps[j];
            amps[i] = c * a + neg_i_s * b;
            amps[j] = neg_i_s * a + c * b;
        }
    }
}

fn apply_ry(amps: &mut [Complex64], num_qubits: u32, qubit: usize, theta: f64) {
    let mask = 1 << qubit;
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            let j = i | mask;
            let a = amps[i];
            let b = amps[j];
            amps[i] = c * a - s * b;
            amps[j] = s * a + c * b;
        }
    }
}

fn apply_rz(amps: &mut [Complex64], num_qubits: u32, qubit: usize, theta: f64) {
    let mask = 1 << qubit;
    let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
    let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            amps[i] *= phase_0;
        } else {
            amps[i] *= phase_1;
        }
    }
}

fn apply_u(amps: &mut [Complex64], num_qubits: u32, qubit: usize, theta: f64, phi: f64, lambda: f64) {
    let mask = 1 << qubit;
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let e_il = Complex64::from_polar(1.0, lambda);
    let e_ip = Complex64::from_polar(1.0, phi);
    let e_ipl = Complex64::from_polar(1.0, phi + lambda);
    for i in 0..size(num_qubits) {
        if i & mask == 0 {
            let j = i | mask;
            let a = amps[i];
            let b = amps[j];
            amps[i] = c * a - e_il * s * b;
            amps[j] = e_ip * s * a + e_ipl * c * b;
        }
    }
}

fn apply_cx(amps: &mut [Complex64], num_qubits: u32, control: usize, target: usize) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    for i in 0..size(num_qubits) {
        if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
            amps.swap(i, i | tgt_mask);
        }
    }
}

fn apply_cy(amps: &mut [Complex64], num_qubits: u32, control: usize, target: usize) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    let i_val = Complex64::new(0.0, 1.0);
    for i in 0..size(num_qubits) {
        if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
            let j = i | tgt_mask;
            let tmp = amps[i];
            amps[i] = -i_val * amps[j];
            amps[j] = i_val * tmp;
        }
    }
}

fn apply_cz(amps: &mut [Complex64], num_qubits: u32, control: usize, target: usize) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    for i in 0..size(num_qubits) {
        if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
            amps[i] = -amps[i];
        }
    }
}

fn apply_swap(amps: &mut [Complex64], num_qubits: u32, q1: usize, q2: usize) {
    let mask1 = 1 << q1;
    let mask2 = 1 << q2;
    for i in 0..size(num_qubits) {
        let b1 = (i & mask1) != 0;
        let b2 = (i & mask2) != 0;
        if b1 && !b2 {
            let j = (i & !mask1) | mask2;
            amps.swap(i, j);
        }
    }
}

fn apply_crz(amps: &mut [Complex64], num_qubits: u32, control: usize, target: usize, theta: f64) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
    let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
    for i in 0..size(num_qubits) {
        if i & ctrl_mask != 0 {
            if i & tgt_mask == 0 {
                amps[i] *= phase_0;
            } else {
                amps[i] *= phase_1;
            }
        }
    }
}

fn apply_cp(amps: &mut [Complex64], num_qubits: u32, control: usize, target: usize, theta: f64) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    let phase = Complex64::from_polar(1.0, theta);
    for i in 0..size(num_qubits) {
        if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
            amps[i] *= phase;
        }
    }
}

fn apply_ccx(amps: &mut [Complex64], num_qubits: u32, c1: usize, c2: usize, target: usize) {
    let c1_mask = 1 << c1;
    let c2_mask = 1 << c2;
    let tgt_mask = 1 << target;
    for i in 0..size(num_qubits) {
        if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
            amps.swap(i, i | tgt_mask);
        }
    }
}

fn apply_cswap(amps: &mut [Complex64], num_qubits: u32, control: usize, t1: usize, t2: usize) {
    let ctrl_mask = 1 << control;
    let t1_mask = 1 << t1;
    let t2_mask = 1 << t2;
    for i in 0..size(num_qubits) {
        if i & ctrl_mask != 0 {
            let b1 = (i & t1_mask) != 0;
            let b2 = (i & t2_mask) != 0;
            if b1 && !b2 {
                let j = (i & !t1_mask) | t2_mask;
                amps.swap(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn hadamard_then_its_adjoint_is_identity() {
        let mut amps = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        apply(&mut amps, 1, &StandardGate::H, &[QubitId(0)]);
        apply(&mut amps, 1, &adjoint(&StandardGate::H), &[QubitId(0)]);
        assert!(approx_eq(amps[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(amps[1], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn bell_pair_has_no_weight_on_mixed_outcomes() {
        let mut amps = vec![Complex64::new(1.0, 0.0); 4];
        amps[1] = Complex64::new(0.0, 0.0);
        amps[2] = Complex64::new(0.0, 0.0);
        amps[3] = Complex64::new(0.0, 0.0);
        apply(&mut amps, 2, &StandardGate::H, &[QubitId(0)]);
        apply(&mut amps, 2, &StandardGate::CX, &[QubitId(0), QubitId(1)]);
        assert!(approx_eq(amps[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(amps[2], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn rz_adjoint_cancels() {
        let mut amps = vec![Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)];
        apply(&mut amps, 1, &StandardGate::Rz(0.37), &[QubitId(0)]);
        apply(&mut amps, 1, &adjoint(&StandardGate::Rz(0.37)), &[QubitId(0)]);
        assert!(approx_eq(amps[0], Complex64::new(0.6, 0.0)));
        assert!(approx_eq(amps[1], Complex64::new(0.8, 0.0)));
    }
}
