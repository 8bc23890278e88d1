//! Property-based tests for the assertion parser.
//!
//! Generates assertion statements over a small register and checks that
//! parsing them recovers the expected target list and, for `assert-eq`,
//! the expected threshold and state-vector length.

use chronoq_ir::{Assertion, RegisterKind, RegisterTable};
use proptest::prelude::*;
use rustc_hash::FxHashSet;

fn registers_with(size: u32) -> RegisterTable {
    let mut table = RegisterTable::new();
    table.declare(RegisterKind::Quantum, "q", size);
    table
}

fn arb_threshold() -> impl Strategy<Value = f64> {
    0.0_f64..=1.0
}

proptest! {
    /// `assert-ent`/`assert-sup` over explicit indices always round-trip to
    /// exactly those targets, in order, with no expansion.
    #[test]
    fn explicit_indices_are_not_expanded(size in 2_u32..8, a in 0_u32..2, b in 0_u32..2) {
        let registers = registers_with(size);
        let (a, b) = (a.min(size - 1), b.min(size - 1));
        let stmt = format!("assert-ent q[{a}], q[{b}]");

        let assertion = chronoq_assert::parse_assertion(
            &stmt,
            1,
            None,
            &registers,
            &FxHashSet::default(),
        )
        .expect("well-formed statement must parse");

        prop_assert_eq!(assertion.targets().len(), 2);
        prop_assert_eq!(assertion.targets()[0].index, a);
        prop_assert_eq!(assertion.targets()[1].index, b);
    }

    /// A bare register name always expands to exactly `size` targets,
    /// `0..size` in order.
    #[test]
    fn whole_register_expands_to_full_size(size in 1_u32..8) {
        let registers = registers_with(size);
        let assertion = chronoq_assert::parse_assertion(
            "assert-sup q",
            1,
            None,
            &registers,
            &FxHashSet::default(),
        )
        .expect("well-formed statement must parse");

        prop_assert_eq!(assertion.targets().len(), size as usize);
        for (i, target) in assertion.targets().iter().enumerate() {
            prop_assert_eq!(target.index, i as u32);
        }
    }

    /// A state-vector literal of the right length always parses as a
    /// `StatevectorEquality` carrying the threshold given in source.
    #[test]
    fn statevector_literal_preserves_threshold(threshold in arb_threshold()) {
        let registers = registers_with(2);
        let stmt = format!("assert-eq {threshold} q[0], q[1]");
        let assertion = chronoq_assert::parse_assertion(
            &stmt,
            1,
            Some("1.0, 0.0, 0.0, 0.0"),
            &registers,
            &FxHashSet::default(),
        )
        .expect("well-formed statement must parse");

        match assertion {
            Assertion::StatevectorEquality { similarity_threshold, expected, .. } => {
                prop_assert!((similarity_threshold - threshold).abs() < 1e-9);
                prop_assert_eq!(expected.len(), 4);
            }
            other => prop_assert!(false, "expected StatevectorEquality, got {other:?}"),
        }
    }

    /// Any threshold outside `[0, 1]` is always rejected, regardless of the
    /// rest of the statement.
    #[test]
    fn out_of_range_threshold_always_rejected(delta in 0.001_f64..5.0) {
        let registers = registers_with(1);
        let threshold = 1.0 + delta;
        let stmt = format!("assert-eq {threshold} q[0]");
        let err = chronoq_assert::parse_assertion(
            &stmt,
            7,
            Some("1.0, 0.0"),
            &registers,
            &FxHashSet::default(),
        )
        .unwrap_err();
        prop_assert!(matches!(
            err,
            chronoq_assert::ParsingError::ThresholdOutOfRange { .. }
        ));
    }
}
