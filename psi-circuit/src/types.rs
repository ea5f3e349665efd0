//! Types shared between the kernel, the circuit and the host-side prover/verifier.

use crate::constants::sentinel;
use crate::error::{SetRole, ZkError};
use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

/// An input set: exactly `N` field elements, none of which may be the sentinel.
///
/// Construction does not check for the sentinel; that is the kernel's first stage so that the
/// rejection is reported as an evaluation outcome rather than a parsing failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSet<F, const N: usize>([F; N]);

impl<F: PrimeField, const N: usize> RawSet<F, N> {
    pub fn new(elements: [F; N]) -> Self {
        Self(elements)
    }

    /// Build a set from a host-side slice.
    ///
    /// More than `N` values is a capacity overflow, never a silent truncation.
    pub fn from_slice(values: &[F]) -> Result<Self, ZkError> {
        if values.len() > N {
            return Err(ZkError::CapacityExceeded { capacity: N, got: values.len() });
        }
        let elements = <[F; N]>::try_from(values)
            .map_err(|_| ZkError::LengthMismatch { expected: N, got: values.len() })?;
        Ok(Self(elements))
    }

    pub fn from_u64s(values: &[u64]) -> Result<Self, ZkError> {
        let elems: Vec<F> = values.iter().map(|v| F::from(*v)).collect();
        Self::from_slice(&elems)
    }

    pub fn elements(&self) -> &[F; N] {
        &self.0
    }

    /// Index of the first slot holding the sentinel, if any.
    pub fn sentinel_position(&self) -> Option<usize> {
        let sentinel = sentinel::<F>();
        self.0.iter().position(|x| *x == sentinel)
    }

    /// Fail with [`ZkError::InvalidInput`] if any slot holds the sentinel.
    pub fn validate(&self, set: SetRole) -> Result<(), ZkError> {
        match self.sentinel_position() {
            Some(index) => Err(ZkError::InvalidInput { set, index }),
            None => Ok(()),
        }
    }
}

/// Fixed-capacity array whose first `active` slots are meaningful and whose remaining slots
/// hold the sentinel.
///
/// Invariant: `active <= N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundedSet<F, const N: usize> {
    slots: [F; N],
    active: usize,
}

impl<F: PrimeField, const N: usize> BoundedSet<F, N> {
    /// Panics if `active > N`; every constructor in this crate upholds that by construction.
    pub(crate) fn from_parts(slots: [F; N], active: usize) -> Self {
        assert!(active <= N, "active count {} exceeds capacity {}", active, N);
        Self { slots, active }
    }

    pub fn slots(&self) -> &[F; N] {
        &self.slots
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// The meaningful prefix.
    pub fn active_slots(&self) -> &[F] {
        &self.slots[..self.active]
    }
}

/// Deduplicated set: distinct values in first-occurrence order, sentinel-padded.
pub type NormalizedSet<F, const N: usize> = BoundedSet<F, N>;

/// Committed set: `hash(normalized[i])` for active slots, sentinel-padded.
pub type HashedSet<F, const N: usize> = BoundedSet<F, N>;

/// Number of distinct private elements present in the public set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cardinality(pub u64);

impl Cardinality {
    pub fn get(self) -> u64 {
        self.0
    }

    pub fn to_field<F: PrimeField>(self) -> F {
        F::from(self.0)
    }
}

/// Result of a successful evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub private_active: usize,
    pub public_active: usize,
    pub cardinality: Cardinality,
}

/// JSON-friendly representation of a field element.
///
/// Fr values are exposed as hex strings of their canonical compressed encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrHex {
    pub hex: String,
}

impl FrHex {
    pub fn from_fr(x: &Fr) -> Result<Self, ZkError> {
        let mut bytes = Vec::new();
        x.serialize_compressed(&mut bytes)
            .map_err(|e| ZkError::Serialization(format!("{e}")))?;
        Ok(Self { hex: hex::encode(bytes) })
    }

    pub fn to_fr(&self) -> Result<Fr, ZkError> {
        let bytes = hex::decode(&self.hex)
            .map_err(|e| ZkError::Serialization(format!("invalid hex: {e}")))?;
        Fr::deserialize_compressed(&bytes[..])
            .map_err(|e| ZkError::Serialization(format!("invalid field bytes: {e}")))
    }
}

/// Self-contained proof object handed to verifiers.
///
/// Carries only public data: the proof, the public set and the declared cardinality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    pub proof_b64: String,
    pub public_set: Vec<FrHex>,
    pub expected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_overflow_and_short_input() {
        let five: Vec<Fr> = (1..=5u64).map(Fr::from).collect();
        let err = RawSet::<Fr, 4>::from_slice(&five).unwrap_err();
        assert!(matches!(err, ZkError::CapacityExceeded { capacity: 4, got: 5 }));

        let err = RawSet::<Fr, 4>::from_u64s(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ZkError::LengthMismatch { expected: 4, got: 3 }));
    }

    #[test]
    fn validate_reports_first_sentinel_slot() {
        let set = RawSet::<Fr, 4>::from_u64s(&[7, 0, 9, 0]).unwrap();
        let err = set.validate(SetRole::Public).unwrap_err();
        assert!(matches!(err, ZkError::InvalidInput { set: SetRole::Public, index: 1 }));

        let ok = RawSet::<Fr, 4>::from_u64s(&[7, 8, 9, 10]).unwrap();
        assert!(ok.validate(SetRole::Private).is_ok());
    }

    #[test]
    fn fr_hex_round_trips() {
        let x = Fr::from(123_456_789u64);
        let h = FrHex::from_fr(&x).unwrap();
        assert_eq!(h.to_fr().unwrap(), x);
        assert!(FrHex { hex: "zz".to_string() }.to_fr().is_err());
    }
}
