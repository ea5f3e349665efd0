//! Native reference kernel.
//!
//! Computes exactly what the circuit constrains, over plain field elements, with the same fixed
//! iteration structure: every loop runs to `N` and every decision is folded in as a boolean
//! weight via [`select`]. The prover runs this first and refuses to prove rejected evaluations.

use crate::constants::sentinel;
use crate::error::{SetRole, ZkError};
use crate::hash::FieldHasher;
use crate::types::{BoundedSet, Cardinality, Evaluation, HashedSet, NormalizedSet, RawSet};
use ark_ff::PrimeField;

/// `cond * a + (1 - cond) * b`.
pub fn select<F: PrimeField>(cond: bool, a: F, b: F) -> F {
    let c = F::from(cond);
    c * a + (F::one() - c) * b
}

/// First-occurrence, forward-only deduplication.
///
/// Element `i` is compared against slots `0..i` only. New elements are compacted into the
/// prefix; the rest is sentinel.
pub fn normalize<F: PrimeField, const N: usize>(
    raw: &RawSet<F, N>,
    set: SetRole,
) -> Result<NormalizedSet<F, N>, ZkError> {
    raw.validate(set)?;
    let elems = raw.elements();

    let mut slots = [sentinel::<F>(); N];
    let mut active = 0usize;

    for i in 0..N {
        let mut seen = false;
        for j in 0..i {
            seen |= elems[i] == elems[j];
        }
        let is_new = !seen;

        // Write position is the number of new elements before `i`.
        for (k, slot) in slots.iter_mut().enumerate() {
            *slot = select(is_new && active == k, elems[i], *slot);
        }
        active += usize::from(is_new);
    }

    Ok(BoundedSet::from_parts(slots, active))
}

/// Hash every active slot; inactive slots stay at the sentinel.
pub fn commit<F: PrimeField, H: FieldHasher<F>, const N: usize>(
    normalized: &NormalizedSet<F, N>,
    hasher: &H,
) -> HashedSet<F, N> {
    let mut slots = [sentinel::<F>(); N];
    for (k, slot) in slots.iter_mut().enumerate() {
        let h = hasher.hash(&normalized.slots()[k]);
        *slot = select(k < normalized.active(), h, sentinel::<F>());
    }
    BoundedSet::from_parts(slots, normalized.active())
}

/// Number of active private commitments that occur among the active public commitments.
///
/// Scans the full `N x N` grid; multiple matches for one private element count once.
pub fn count<F: PrimeField, const N: usize>(
    private: &HashedSet<F, N>,
    public: &HashedSet<F, N>,
) -> Cardinality {
    let (a, b) = (private.slots(), public.slots());
    let mut total = 0u64;

    for i in 0..N {
        let mut found = false;
        for j in 0..N {
            found |= j < public.active() && a[i] == b[j];
        }
        total += u64::from(i < private.active() && found);
    }

    Cardinality(total)
}

pub fn assert_cardinality(cardinality: Cardinality, expected: u64) -> Result<(), ZkError> {
    if cardinality.get() != expected {
        return Err(ZkError::CardinalityMismatch { expected, computed: cardinality.get() });
    }
    Ok(())
}

/// Run the whole pipeline: validate, normalize, commit, count, assert.
pub fn evaluate<F: PrimeField, H: FieldHasher<F>, const N: usize>(
    private: &RawSet<F, N>,
    public: &RawSet<F, N>,
    expected: u64,
    hasher: &H,
) -> Result<Evaluation, ZkError> {
    private.validate(SetRole::Private)?;
    public.validate(SetRole::Public)?;

    let norm_a = normalize(private, SetRole::Private)?;
    let norm_b = normalize(public, SetRole::Public)?;

    let hashed_a = commit(&norm_a, hasher);
    let hashed_b = commit(&norm_b, hasher);

    let cardinality = count(&hashed_a, &hashed_b);
    assert_cardinality(cardinality, expected)?;

    Ok(Evaluation {
        private_active: norm_a.active(),
        public_active: norm_b.active(),
        cardinality,
    })
}

/// Cardinality without the assertion stage.
///
/// Used by hosts that need to learn the public output before declaring it.
pub fn compute_cardinality<F: PrimeField, H: FieldHasher<F>, const N: usize>(
    private: &RawSet<F, N>,
    public: &RawSet<F, N>,
    hasher: &H,
) -> Result<Cardinality, ZkError> {
    let norm_a = normalize(private, SetRole::Private)?;
    let norm_b = normalize(public, SetRole::Public)?;
    Ok(count(&commit(&norm_a, hasher), &commit(&norm_b, hasher)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::PoseidonHasher;
    use ark_bn254::Fr;

    fn set(values: [u64; 4]) -> RawSet<Fr, 4> {
        RawSet::from_u64s(&values).unwrap()
    }

    fn run(a: [u64; 4], b: [u64; 4], expected: u64) -> Result<Evaluation, ZkError> {
        evaluate(&set(a), &set(b), expected, &PoseidonHasher::<Fr>::default())
    }

    #[test]
    fn select_picks_branch() {
        let (a, b) = (Fr::from(3u64), Fr::from(5u64));
        assert_eq!(select(true, a, b), a);
        assert_eq!(select(false, a, b), b);
    }

    #[test]
    fn normalize_keeps_first_occurrence_order() {
        let n = normalize(&set([3, 1, 3, 2]), SetRole::Private).unwrap();
        assert_eq!(n.active(), 3);
        assert_eq!(
            n.slots(),
            &[Fr::from(3u64), Fr::from(1u64), Fr::from(2u64), Fr::from(0u64)]
        );
    }

    #[test]
    fn normalize_edge_cases() {
        let all_equal = normalize(&set([5, 5, 5, 5]), SetRole::Public).unwrap();
        assert_eq!(all_equal.active(), 1);
        assert_eq!(all_equal.active_slots(), &[Fr::from(5u64)]);

        let distinct = normalize(&set([4, 3, 2, 1]), SetRole::Public).unwrap();
        assert_eq!(distinct.active(), 4);
        assert_eq!(distinct.slots(), set([4, 3, 2, 1]).elements());
    }

    #[test]
    fn commit_pads_inactive_slots_with_sentinel() {
        let hasher = PoseidonHasher::<Fr>::default();
        let n = normalize(&set([8, 8, 9, 9]), SetRole::Private).unwrap();
        let h = commit(&n, &hasher);

        assert_eq!(h.active(), 2);
        assert_eq!(h.slots()[0], hasher.hash(&Fr::from(8u64)));
        assert_eq!(h.slots()[1], hasher.hash(&Fr::from(9u64)));
        assert_eq!(h.slots()[2], Fr::from(0u64));
        assert_eq!(h.slots()[3], Fr::from(0u64));
    }

    #[test]
    fn concrete_scenarios() {
        assert_eq!(run([1, 2, 3, 4], [3, 4, 5, 6], 2).unwrap().cardinality, Cardinality(2));
        assert_eq!(run([1, 2, 3, 4], [5, 6, 7, 8], 0).unwrap().cardinality, Cardinality(0));
        assert_eq!(run([9, 10, 11, 12], [12, 11, 10, 9], 4).unwrap().cardinality, Cardinality(4));

        let dup = run([1, 1, 2, 3], [2, 2, 3, 4], 2).unwrap();
        assert_eq!(dup.private_active, 3);
        assert_eq!(dup.public_active, 3);
        assert_eq!(dup.cardinality, Cardinality(2));
    }

    #[test]
    fn wrong_expected_is_rejected() {
        let err = run([1, 2, 3, 4], [3, 4, 5, 6], 3).unwrap_err();
        assert!(matches!(err, ZkError::CardinalityMismatch { expected: 3, computed: 2 }));
        assert_eq!(err.rejection_reason(), Some("cardinality_mismatch"));
    }

    #[test]
    fn sentinel_is_rejected_before_counting() {
        let err = run([1, 0, 3, 4], [3, 4, 5, 6], 2).unwrap_err();
        assert!(matches!(err, ZkError::InvalidInput { set: SetRole::Private, index: 1 }));

        let err = run([1, 2, 3, 4], [3, 4, 5, 0], 2).unwrap_err();
        assert!(matches!(err, ZkError::InvalidInput { set: SetRole::Public, index: 3 }));
    }

    #[test]
    fn repeated_public_matches_count_once() {
        let c = compute_cardinality(&set([7, 1, 2, 3]), &set([7, 7, 7, 7]), &PoseidonHasher::<Fr>::default())
            .unwrap();
        assert_eq!(c, Cardinality(1));
    }
}
