//! Property-based tests for the cardinality kernel
//!
//! Tests for:
//! - Idempotence of normalization on the active region
//! - Agreement between the fixed-loop kernel, the hash-set oracle and the circuit
//! - Symmetry and range of the cardinality

use crate::circuit::PsiCardinalityCircuit;
use crate::error::{SetRole, ZkError};
use crate::hash::PoseidonHasher;
use crate::kernel::{compute_cardinality, evaluate, normalize};
use crate::oracle;
use crate::types::RawSet;
use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use proptest::prelude::*;

const N: usize = 4;

fn raw(values: [u64; N]) -> RawSet<Fr, N> {
    RawSet::from_u64s(&values).unwrap()
}

// Small domain so that duplicates and overlaps are frequent.
fn small_set() -> impl Strategy<Value = [u64; N]> {
    prop::array::uniform4(1u64..7)
}

proptest! {
    /// normalize(normalize(x)) == normalize(x) on the active region.
    ///
    /// The normalized prefix is padded back to capacity by repeating its first element, which
    /// deduplication then drops again.
    #[test]
    fn prop_normalize_idempotent(values in small_set()) {
        let once = normalize(&raw(values), SetRole::Private).unwrap();

        let mut padded = [once.slots()[0]; N];
        padded[..once.active()].copy_from_slice(once.active_slots());
        let twice = normalize(&RawSet::new(padded), SetRole::Private).unwrap();

        prop_assert_eq!(once.active(), twice.active());
        prop_assert_eq!(once.active_slots(), twice.active_slots());
    }

    /// Active prefix holds no duplicates and preserves first-occurrence order.
    #[test]
    fn prop_normalize_matches_first_occurrence(values in small_set()) {
        let set = raw(values);
        let normalized = normalize(&set, SetRole::Public).unwrap();
        prop_assert_eq!(normalized.active_slots().to_vec(), oracle::distinct(&set));
        for slot in &normalized.slots()[normalized.active()..] {
            prop_assert_eq!(*slot, Fr::from(0u64));
        }
    }

    /// Fixed-loop kernel agrees with the hash-set oracle.
    #[test]
    fn prop_count_matches_oracle(a in small_set(), b in small_set()) {
        let hasher = PoseidonHasher::<Fr>::default();
        let kernel = compute_cardinality(&raw(a), &raw(b), &hasher).unwrap();
        let reference = oracle::cardinality(&raw(a), &raw(b), &hasher).unwrap();
        prop_assert_eq!(kernel, reference);
    }

    /// 0 <= count <= min(distinct(A), distinct(B)).
    #[test]
    fn prop_count_in_range(a in small_set(), b in small_set()) {
        let hasher = PoseidonHasher::<Fr>::default();
        let c = compute_cardinality(&raw(a), &raw(b), &hasher).unwrap().get() as usize;
        let bound = oracle::distinct(&raw(a)).len().min(oracle::distinct(&raw(b)).len());
        prop_assert!(c <= bound);
    }

    /// count(A, B) == count(B, A) for duplicate-free inputs.
    #[test]
    fn prop_count_symmetric_without_duplicates(a in prop::array::uniform4(1u64..20), b in prop::array::uniform4(1u64..20)) {
        prop_assume!(oracle::distinct(&raw(a)).len() == N);
        prop_assume!(oracle::distinct(&raw(b)).len() == N);

        let hasher = PoseidonHasher::<Fr>::default();
        let ab = compute_cardinality(&raw(a), &raw(b), &hasher).unwrap();
        let ba = compute_cardinality(&raw(b), &raw(a), &hasher).unwrap();
        prop_assert_eq!(ab, ba);
    }

    /// A sentinel anywhere in the private set is rejected before counting.
    #[test]
    fn prop_sentinel_rejected(values in small_set(), index in 0usize..N, expected in 0u64..5) {
        let mut values = values;
        values[index] = 0;
        let err = evaluate(&raw(values), &raw([1, 2, 3, 4]), expected, &PoseidonHasher::<Fr>::default())
            .unwrap_err();
        let is_invalid_private = matches!(err, ZkError::InvalidInput { set: SetRole::Private, .. });
        prop_assert!(is_invalid_private);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The circuit is satisfied exactly when the kernel accepts.
    #[test]
    fn prop_circuit_agrees_with_kernel(a in small_set(), b in small_set(), delta in 0u64..2) {
        let hasher = PoseidonHasher::<Fr>::default();
        let expected = compute_cardinality(&raw(a), &raw(b), &hasher).unwrap().get() + delta;
        let accepted = evaluate(&raw(a), &raw(b), expected, &hasher).is_ok();

        let circuit = PsiCardinalityCircuit::<Fr, _, N> {
            private_set: raw(a),
            public_set: raw(b),
            expected,
            hasher,
        };
        let cs = ConstraintSystem::<Fr>::new_ref();
        let satisfied = circuit.generate_constraints(cs.clone()).is_ok() && cs.is_satisfied().unwrap();

        prop_assert_eq!(accepted, satisfied);
        prop_assert_eq!(accepted, delta == 0);
    }
}
