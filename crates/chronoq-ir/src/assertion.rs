//! The assertion data model (spec §4.A).
//!
//! This module only holds the *value* types. Turning source text into an
//! [`Assertion`] is `chronoq-assert`'s job; turning an [`Assertion`] plus a
//! live quantum state into a pass/fail verdict is `chronoq-engine`'s job
//! (the assertion checker, spec §4.G).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::qubit::RegisterRef;

/// A literal expected state vector, e.g. `{ 1.0, 0.0, 0.0, 0.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatevectorLiteral(pub Vec<Complex64>);

impl StatevectorLiteral {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A tagged assertion variant (spec §4.A/§3).
///
/// Modeled as a single enum with a `check` dispatch in the checker rather
/// than the original's base-class-plus-downcast hierarchy (spec §9,
/// "Polymorphic assertions").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Assertion {
    /// `assert-ent q[0], q[1];`
    Entanglement { targets: Vec<RegisterRef> },
    /// `assert-sup q[0];`
    Superposition { targets: Vec<RegisterRef> },
    /// `assert-eq 0.9 q[0], q[1] { 1.0, 0.0, 0.0, 0.0 };`
    StatevectorEquality {
        targets: Vec<RegisterRef>,
        similarity_threshold: f64,
        expected: StatevectorLiteral,
    },
    /// `assert-eq 0.9 q[0], q[1] { h q[0]; cx q[0], q[1]; };`
    CircuitEquality {
        targets: Vec<RegisterRef>,
        similarity_threshold: f64,
        circuit_code: String,
    },
    /// `assert-span …` — reserved, never implemented (spec §9).
    Span { targets: Vec<RegisterRef> },
}

impl Assertion {
    /// The targets this assertion refers to, in source order.
    pub fn targets(&self) -> &[RegisterRef] {
        match self {
            Assertion::Entanglement { targets }
            | Assertion::Superposition { targets }
            | Assertion::StatevectorEquality { targets, .. }
            | Assertion::CircuitEquality { targets, .. }
            | Assertion::Span { targets } => targets,
        }
    }

    /// Human-readable keyword used in source (for diagnostics/errors).
    pub fn keyword(&self) -> &'static str {
        match self {
            Assertion::Entanglement { .. } => "assert-ent",
            Assertion::Superposition { .. } => "assert-sup",
            Assertion::StatevectorEquality { .. } | Assertion::CircuitEquality { .. } => {
                "assert-eq"
            }
            Assertion::Span { .. } => "assert-span",
        }
    }
}
