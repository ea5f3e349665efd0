//! Crate-wide constants used by the ZK circuit and host-side orchestration.

use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;

/// Number of slots in every set handled by the circuit.
///
/// Sets are fixed-capacity: the count of active elements varies, the array length does not.
pub const SET_CAPACITY: usize = 4;

/// Reserved value marking an unused slot. Never a valid set element.
pub const SENTINEL: u64 = 0;

// Poseidon sponge configuration.
//
// Width-3 sponge (rate=2, capacity=1). Each commitment absorbs a single field element and
// squeezes a single field element.
//
// NOTE: This is a prototype. For production, parameters should be reviewed by cryptographers
// and ideally fixed via audited constants / standard sets.
pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;

pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Poseidon S-box exponent (alpha).
pub const POSEIDON_ALPHA: u64 = 5;

/// Deterministically derive Poseidon parameters for any prime field.
///
/// Both the native hasher and the in-circuit gadget take their constants from here, so the two
/// always agree on the same round constants and MDS matrix.
pub fn poseidon_config<F: PrimeField>() -> PoseidonConfig<F> {
    let prime_bits = F::MODULUS_BIT_SIZE as u64;

    let (ark, mds) = find_poseidon_ark_and_mds::<F>(
        prime_bits,
        POSEIDON_RATE,
        POSEIDON_FULL_ROUNDS as u64,
        POSEIDON_PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(
        POSEIDON_FULL_ROUNDS,
        POSEIDON_PARTIAL_ROUNDS,
        POSEIDON_ALPHA,
        mds,
        ark,
        POSEIDON_RATE,
        POSEIDON_CAPACITY,
    )
}

/// [`SENTINEL`] as a field element.
pub fn sentinel<F: PrimeField>() -> F {
    F::from(SENTINEL)
}
