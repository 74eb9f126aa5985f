//! Property-based tests for Pauli label parsing and operator algebra.

use num_complex::Complex64;
use proptest::prelude::*;
use qrt_ir::{PauliString, SparsePauliOp};

const ATOL: f64 = 1e-9;

/// Labels of 1-8 qubits over the I/X/Y/Z alphabet.
fn arb_label() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['I', 'X', 'Y', 'Z']), 1..=8)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Two labels of the same width.
fn arb_label_pair() -> impl Strategy<Value = (String, String)> {
    (1_usize..=8).prop_flat_map(|n| {
        let alphabet = prop::sample::select(vec!['I', 'X', 'Y', 'Z']);
        (
            prop::collection::vec(alphabet.clone(), n),
            prop::collection::vec(alphabet, n),
        )
            .prop_map(|(a, b)| (a.into_iter().collect(), b.into_iter().collect()))
    })
}

proptest! {
    #[test]
    fn label_display_roundtrip(label in arb_label()) {
        let parsed = PauliString::from_label(&label).unwrap();
        prop_assert_eq!(parsed.num_qubits(), label.len());
        prop_assert_eq!(parsed.to_string(), label);
    }

    #[test]
    fn rightmost_character_is_qubit_zero(label in arb_label()) {
        let parsed = PauliString::from_label(&label).unwrap();
        let last = label.chars().last().unwrap();
        prop_assert_eq!(parsed.get(0).as_char(), last);
    }

    #[test]
    fn rejects_foreign_characters(label in arb_label(), bad in "[a-hj-z0-9]") {
        let corrupted = format!("{label}{bad}");
        prop_assert!(SparsePauliOp::from_label(&corrupted).is_err());
    }

    #[test]
    fn pauli_squares_to_identity(label in arb_label()) {
        let op = SparsePauliOp::from_label(&label).unwrap();
        let sq = op.compose(&op).unwrap().simplify(ATOL);
        prop_assert_eq!(sq.terms().len(), 1);
        prop_assert!(sq.terms()[0].0.is_identity());
        prop_assert!((sq.terms()[0].1 - Complex64::new(1.0, 0.0)).norm() < ATOL);
    }

    #[test]
    fn product_phase_matches_commutation((a, b) in arb_label_pair()) {
        let pa = PauliString::from_label(&a).unwrap();
        let pb = PauliString::from_label(&b).unwrap();
        let (k_ab, p_ab) = pa.mul(&pb);
        let (k_ba, p_ba) = pb.mul(&pa);
        prop_assert_eq!(p_ab, p_ba);
        // AB = ±BA, with the sign fixed by commutation.
        let same = k_ab == k_ba;
        prop_assert_eq!(same, pa.commutes_with(&pb));
    }

    #[test]
    fn hermitian_sums_stay_hermitian((a, b) in arb_label_pair(), ca in -2.0_f64..2.0, cb in -2.0_f64..2.0) {
        let op = SparsePauliOp::from_list([(a.as_str(), ca), (b.as_str(), cb)]).unwrap();
        prop_assert!(op.is_hermitian(ATOL));
        prop_assert!(op.compose(&op).unwrap().is_hermitian(ATOL));
    }
}
