//! R1CS circuit for proving a private set-intersection cardinality.
//!
//! What this circuit proves:
//! 1) The prover knows a private set `A` of `N` non-sentinel field elements.
//! 2) The public set `B` holds `N` non-sentinel field elements.
//! 3) After first-occurrence deduplication of both sets and a one-way commitment of every
//!    unique element, exactly `expected` unique elements of `A` have a commitment that also
//!    appears among the commitments of `B`.
//!
//! Privacy: `A` is a witness. Only `B` and `expected` are public.
//!
//! Every loop is unrolled to the full capacity `N` and every decision is a boolean selection,
//! so the constraint system has the same shape for every input.

use crate::constants::sentinel;
use crate::hash::FieldHasher;
use crate::types::RawSet;
use ark_ff::PrimeField;
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

/// In-circuit counterpart of a bounded set: `N` slots plus one activity bit per slot.
struct BoundedSetVar<F: PrimeField> {
    slots: Vec<FpVar<F>>,
    active: Vec<Boolean<F>>,
}

/// Enforce that no slot holds the sentinel.
fn enforce_no_sentinel<F: PrimeField>(set: &[FpVar<F>]) -> Result<(), SynthesisError> {
    let sentinel = FpVar::<F>::constant(sentinel::<F>());
    for x in set {
        x.enforce_not_equal(&sentinel)?;
    }
    Ok(())
}

/// First-occurrence deduplication with compaction.
///
/// Element `i` is new iff it differs from every `raw[j]`, `j < i`. Its write position is the
/// running count of new elements before it, and slot `k` takes it iff it is new and that
/// position equals `k`.
fn normalize_var<F: PrimeField>(raw: &[FpVar<F>]) -> Result<BoundedSetVar<F>, SynthesisError> {
    let n = raw.len();
    let zero = FpVar::<F>::zero();
    let one = FpVar::<F>::one();

    let mut slots = vec![FpVar::<F>::constant(sentinel::<F>()); n];
    let mut active = vec![Boolean::<F>::FALSE; n];
    let mut position = FpVar::<F>::zero();

    for i in 0..n {
        let mut seen = Boolean::<F>::FALSE;
        for j in 0..i {
            seen = &seen | &raw[i].is_eq(&raw[j])?;
        }
        let is_new = !&seen;

        for k in 0..n {
            let at_k = position.is_eq(&FpVar::<F>::constant(F::from(k as u64)))?;
            let write = &is_new & &at_k;
            slots[k] = write.select(&raw[i], &slots[k])?;
            active[k] = &active[k] | &write;
        }

        position += is_new.select(&one, &zero)?;
    }

    Ok(BoundedSetVar { slots, active })
}

/// Commit every slot, then keep the commitment only where the slot is active.
fn commit_var<F: PrimeField, H: FieldHasher<F>>(
    cs: ConstraintSystemRef<F>,
    set: BoundedSetVar<F>,
    hasher: &H,
) -> Result<BoundedSetVar<F>, SynthesisError> {
    let sentinel = FpVar::<F>::constant(sentinel::<F>());
    let mut slots = Vec::with_capacity(set.slots.len());

    for (x, is_active) in set.slots.iter().zip(&set.active) {
        let h = hasher.hash_var(cs.clone(), x)?;
        slots.push(is_active.select(&h, &sentinel)?);
    }

    Ok(BoundedSetVar { slots, active: set.active })
}

/// Count active private commitments that appear among active public commitments.
fn count_var<F: PrimeField>(
    private: &BoundedSetVar<F>,
    public: &BoundedSetVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    let zero = FpVar::<F>::zero();
    let one = FpVar::<F>::one();
    let mut total = FpVar::<F>::zero();

    for (a, a_active) in private.slots.iter().zip(&private.active) {
        let mut found = Boolean::<F>::FALSE;
        for (b, b_active) in public.slots.iter().zip(&public.active) {
            let hit = b_active & &a.is_eq(b)?;
            found = &found | &hit;
        }
        let counted = a_active & &found;
        total += counted.select(&one, &zero)?;
    }

    Ok(total)
}

/// Public input vector for a `(public_set, expected)` statement.
///
/// ORDERING MUST MATCH the `new_input` allocation order in `generate_constraints`:
/// `B[0..N]`, then `expected`.
pub fn public_input_elems<F: PrimeField, const N: usize>(public_set: &RawSet<F, N>, expected: u64) -> Vec<F> {
    let mut v = Vec::with_capacity(N + 1);
    v.extend_from_slice(public_set.elements());
    v.push(F::from(expected));
    v
}

/// Circuit proving `|dedup(A) ∩ dedup(B)| == expected` over commitments.
#[derive(Clone, Debug)]
pub struct PsiCardinalityCircuit<F: PrimeField, H, const N: usize> {
    /// Private set (witness).
    pub private_set: RawSet<F, N>,

    /// Public set.
    pub public_set: RawSet<F, N>,

    /// Public declared cardinality.
    pub expected: u64,

    pub hasher: H,
}

impl<F: PrimeField, H: FieldHasher<F>, const N: usize> ConstraintSynthesizer<F> for PsiCardinalityCircuit<F, H, N> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        // --- Public inputs ---
        // IMPORTANT: ordering MUST match `public_input_elems`.
        let mut public_set = Vec::<FpVar<F>>::with_capacity(N);
        for x in self.public_set.elements() {
            public_set.push(FpVar::<F>::new_input(cs.clone(), || Ok(*x))?);
        }
        let expected = FpVar::<F>::new_input(cs.clone(), || Ok(F::from(self.expected)))?;

        // --- Witness ---
        let mut private_set = Vec::<FpVar<F>>::with_capacity(N);
        for x in self.private_set.elements() {
            private_set.push(FpVar::<F>::new_witness(cs.clone(), || Ok(*x))?);
        }

        enforce_no_sentinel(&private_set)?;
        enforce_no_sentinel(&public_set)?;

        let norm_a = normalize_var(&private_set)?;
        let norm_b = normalize_var(&public_set)?;

        let hashed_a = commit_var(cs.clone(), norm_a, &self.hasher)?;
        let hashed_b = commit_var(cs, norm_b, &self.hasher)?;

        let cardinality = count_var(&hashed_a, &hashed_b)?;
        cardinality.enforce_equal(&expected)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::PoseidonHasher;
    use crate::kernel;
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;

    type Circuit = PsiCardinalityCircuit<Fr, PoseidonHasher<Fr>, 4>;

    fn circuit(a: [u64; 4], b: [u64; 4], expected: u64) -> Circuit {
        PsiCardinalityCircuit {
            private_set: RawSet::from_u64s(&a).unwrap(),
            public_set: RawSet::from_u64s(&b).unwrap(),
            expected,
            hasher: PoseidonHasher::default(),
        }
    }

    /// Returns (satisfied, num_constraints).
    fn synthesize(c: Circuit) -> (bool, usize) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        match c.generate_constraints(cs.clone()) {
            Ok(()) => (cs.is_satisfied().unwrap(), cs.num_constraints()),
            Err(_) => (false, cs.num_constraints()),
        }
    }

    #[test]
    fn accepts_concrete_scenarios() {
        assert!(synthesize(circuit([1, 2, 3, 4], [3, 4, 5, 6], 2)).0);
        assert!(synthesize(circuit([1, 2, 3, 4], [5, 6, 7, 8], 0)).0);
        assert!(synthesize(circuit([9, 10, 11, 12], [12, 11, 10, 9], 4)).0);
        assert!(synthesize(circuit([1, 1, 2, 3], [2, 2, 3, 4], 2)).0);
    }

    #[test]
    fn rejects_wrong_cardinality() {
        assert!(!synthesize(circuit([1, 2, 3, 4], [3, 4, 5, 6], 3)).0);
        assert!(!synthesize(circuit([1, 1, 2, 3], [2, 2, 3, 4], 3)).0);
    }

    #[test]
    fn rejects_sentinel_in_either_set() {
        assert!(!synthesize(circuit([1, 0, 3, 4], [3, 4, 5, 6], 2)).0);
        assert!(!synthesize(circuit([1, 2, 3, 4], [0, 4, 5, 6], 1)).0);
    }

    #[test]
    fn agrees_with_kernel_on_duplicates() {
        let hasher = PoseidonHasher::<Fr>::default();
        let cases = [
            ([5u64, 5, 5, 5], [5u64, 6, 6, 7]),
            ([1, 2, 1, 2], [2, 2, 2, 2]),
            ([3, 4, 3, 9], [9, 3, 4, 4]),
        ];
        for (a, b) in cases {
            let ra = RawSet::<Fr, 4>::from_u64s(&a).unwrap();
            let rb = RawSet::<Fr, 4>::from_u64s(&b).unwrap();
            let expected = kernel::compute_cardinality(&ra, &rb, &hasher).unwrap().get();
            assert!(synthesize(circuit(a, b, expected)).0, "{a:?} / {b:?}");
            assert!(!synthesize(circuit(a, b, expected + 1)).0);
        }
    }

    #[test]
    fn constraint_count_is_input_independent() {
        let (_, n1) = synthesize(circuit([1, 2, 3, 4], [3, 4, 5, 6], 2));
        let (_, n2) = synthesize(circuit([7, 7, 7, 7], [7, 7, 7, 7], 1));
        let (_, n3) = synthesize(circuit([1, 2, 3, 4], [5, 6, 7, 8], 0));
        assert_eq!(n1, n2);
        assert_eq!(n1, n3);
    }

    #[test]
    fn public_inputs_follow_allocation_order() {
        let b = RawSet::<Fr, 4>::from_u64s(&[3, 4, 5, 6]).unwrap();
        let v = public_input_elems(&b, 2);
        assert_eq!(v.len(), 5);
        assert_eq!(&v[..4], b.elements());
        assert_eq!(v[4], Fr::from(2u64));
    }
}
