//! One-way commitment primitive, in native and in-circuit form.

use crate::constants::poseidon_config;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::{Absorb, CryptographicSponge};
use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Field-to-field one-way hash used to commit set elements.
///
/// Implementations must be deterministic, preimage- and collision-resistant over `F`, and the
/// native and gadget forms must agree on every input. An invertible map (identity, scaling)
/// destroys the hiding of the private set and is never an acceptable implementation.
pub trait FieldHasher<F: PrimeField>: Clone {
    fn hash(&self, x: &F) -> F;

    fn hash_var(&self, cs: ConstraintSystemRef<F>, x: &FpVar<F>) -> Result<FpVar<F>, SynthesisError>;
}

/// Single-element Poseidon sponge: absorb `x`, squeeze one element.
#[derive(Clone, Debug)]
pub struct PoseidonHasher<F: PrimeField> {
    config: PoseidonConfig<F>,
}

impl<F: PrimeField> PoseidonHasher<F> {
    pub fn new(config: PoseidonConfig<F>) -> Self {
        Self { config }
    }
}

impl<F: PrimeField> Default for PoseidonHasher<F> {
    fn default() -> Self {
        Self::new(poseidon_config::<F>())
    }
}

impl<F: PrimeField + Absorb> FieldHasher<F> for PoseidonHasher<F> {
    fn hash(&self, x: &F) -> F {
        let mut sponge = PoseidonSponge::<F>::new(&self.config);
        sponge.absorb(x);
        sponge.squeeze_field_elements::<F>(1)[0]
    }

    fn hash_var(&self, cs: ConstraintSystemRef<F>, x: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        let mut sponge = PoseidonSpongeVar::<F>::new(cs, &self.config);
        sponge.absorb(x)?;
        Ok(sponge.squeeze_field_elements(1)?[0].clone())
    }
}
