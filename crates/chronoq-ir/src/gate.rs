//! Built-in quantum gate vocabulary.
//!
//! Gate parameters here are always bound `f64` values: the debugger never
//! carries unbound symbolic parameters, so there is no `ParameterExpression`
//! in this crate.

use serde::{Deserialize, Serialize};

/// A built-in gate, with already-evaluated numeric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    P(f64),
    U(f64, f64, f64),
    CX,
    CY,
    CZ,
    Swap,
    CRz(f64),
    CP(f64),
    CCX,
    CSwap,
}

impl StandardGate {
    /// Canonical lowercase OpenQASM-style name.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate acts on.
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(..) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::Swap
            | StandardGate::CRz(_)
            | StandardGate::CP(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Parse a gate by its lowercase name and a parameter list (already
    /// evaluated to `f64`). Returns `None` for unknown names or arity
    /// mismatches; the caller (the preprocessor) turns that into a
    /// `ParsingError`.
    pub fn from_name(name: &str, params: &[f64]) -> Option<Self> {
        Some(match (name, params) {
            ("id", []) => StandardGate::I,
            ("x", []) => StandardGate::X,
            ("y", []) => StandardGate::Y,
            ("z", []) => StandardGate::Z,
            ("h", []) => StandardGate::H,
            ("s", []) => StandardGate::S,
            ("sdg", []) => StandardGate::Sdg,
            ("t", []) => StandardGate::T,
            ("tdg", []) => StandardGate::Tdg,
            ("rx", [theta]) => StandardGate::Rx(*theta),
            ("ry", [theta]) => StandardGate::Ry(*theta),
            ("rz", [theta]) => StandardGate::Rz(*theta),
            ("p", [theta]) => StandardGate::P(*theta),
            ("u", [theta, phi, lambda]) => StandardGate::U(*theta, *phi, *lambda),
            ("cx", []) | ("cnot", []) => StandardGate::CX,
            ("cy", []) => StandardGate::CY,
            ("cz", []) => StandardGate::CZ,
            ("swap", []) => StandardGate::Swap,
            ("crz", [theta]) => StandardGate::CRz(*theta),
            ("cp", [theta]) => StandardGate::CP(*theta),
            ("ccx", []) | ("toffoli", []) => StandardGate::CCX,
            ("cswap", []) => StandardGate::CSwap,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_rejected() {
        assert!(StandardGate::from_name("rx", &[]).is_none());
        assert!(StandardGate::from_name("h", &[1.0]).is_none());
    }

    #[test]
    fn known_gates_round_trip_name() {
        let g = StandardGate::from_name("cx", &[]).unwrap();
        assert_eq!(g.name(), "cx");
        assert_eq!(g.num_qubits(), 2);
    }
}
