//! Hash-set reference for the intersection cardinality.
//!
//! Linear-time and data-dependent, so it must never be mirrored in the circuit. It exists to
//! cross-check the fixed-loop kernel.

use crate::error::{SetRole, ZkError};
use crate::hash::FieldHasher;
use crate::types::{Cardinality, RawSet};
use ark_ff::PrimeField;
use std::collections::HashSet;

/// Distinct elements of `raw`, in first-occurrence order.
pub fn distinct<F: PrimeField, const N: usize>(raw: &RawSet<F, N>) -> Vec<F> {
    let mut seen = HashSet::with_capacity(N);
    raw.elements().iter().copied().filter(|x| seen.insert(*x)).collect()
}

pub fn cardinality<F: PrimeField, H: FieldHasher<F>, const N: usize>(
    private: &RawSet<F, N>,
    public: &RawSet<F, N>,
    hasher: &H,
) -> Result<Cardinality, ZkError> {
    private.validate(SetRole::Private)?;
    public.validate(SetRole::Public)?;

    let public_commitments: HashSet<F> = distinct(public).iter().map(|x| hasher.hash(x)).collect();
    let hits = distinct(private)
        .iter()
        .filter(|x| public_commitments.contains(&hasher.hash(x)))
        .count();

    Ok(Cardinality(hits as u64))
}
