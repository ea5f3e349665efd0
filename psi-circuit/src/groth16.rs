//! Groth16 prover/verifier orchestration for the cardinality circuit.
//!
//! SECURITY NOTE (prototype): Groth16 requires a trusted setup that produces a proving key (PK)
//! and verifying key (VK). This prototype generates keys locally. In production, an MPC ceremony
//! (or a transparent system) should be used.

use crate::circuit::{public_input_elems, PsiCardinalityCircuit};
use crate::error::ZkError;
use crate::hash::PoseidonHasher;
use crate::kernel;
use crate::types::{Evaluation, FrHex, ProofArtifact, RawSet};
use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use base64::Engine;
use rand::{CryptoRng, RngCore};
use tracing::debug;

/// Generate a Groth16 keypair for the circuit of capacity `N`.
///
/// The constraint system depends only on `N`, so this must run once per capacity.
pub fn setup_keys<const N: usize>(
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(ProvingKey<Bn254>, VerifyingKey<Bn254>), ZkError> {
    // Any valid statement works; constraints only depend on N.
    let dummy: Vec<u64> = (1..=N as u64).collect();
    let dummy_set = RawSet::<Fr, N>::from_u64s(&dummy)?;

    let circuit = PsiCardinalityCircuit::<Fr, _, N> {
        private_set: dummy_set,
        public_set: dummy_set,
        expected: N as u64,
        hasher: PoseidonHasher::<Fr>::default(),
    };

    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| ZkError::Ark(format!("{e}")))?;

    debug!(capacity = N, "groth16 keys generated");
    Ok((pk, vk))
}

/// Prove that `private_set` shares exactly `expected` distinct elements with `public_set`.
///
/// The native kernel runs first: a rejected evaluation returns its error and no proof is
/// produced.
pub fn prove_cardinality<const N: usize>(
    rng: &mut (impl RngCore + CryptoRng),
    pk: &ProvingKey<Bn254>,
    private_set: RawSet<Fr, N>,
    public_set: RawSet<Fr, N>,
    expected: u64,
) -> Result<(Proof<Bn254>, Evaluation), ZkError> {
    let hasher = PoseidonHasher::<Fr>::default();
    let evaluation = kernel::evaluate(&private_set, &public_set, expected, &hasher)?;

    let circuit = PsiCardinalityCircuit::<Fr, _, N> {
        private_set,
        public_set,
        expected,
        hasher,
    };

    let proof = Groth16::<Bn254>::prove(pk, circuit, rng)
        .map_err(|e| ZkError::Ark(format!("{e}")))?;

    Ok((proof, evaluation))
}

/// Verify a proof against a declared public set and cardinality.
pub fn verify_cardinality_proof<const N: usize>(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public_set: &RawSet<Fr, N>,
    expected: u64,
) -> Result<(), ZkError> {
    let public_inputs = public_input_elems(public_set, expected);
    let ok = Groth16::<Bn254>::verify(vk, &public_inputs, proof)
        .map_err(|e| ZkError::Ark(format!("{e}")))?;
    if !ok {
        return Err(ZkError::VerificationFailed);
    }
    Ok(())
}

/// Serialize a proving key to bytes.
pub fn serialize_pk(pk: &ProvingKey<Bn254>) -> Result<Vec<u8>, ZkError> {
    let mut out = Vec::new();
    pk.serialize_compressed(&mut out)
        .map_err(|e| ZkError::Serialization(format!("{e}")))?;
    Ok(out)
}

pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, ZkError> {
    ProvingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ZkError::Serialization(format!("{e}")))
}

pub fn serialize_vk(vk: &VerifyingKey<Bn254>) -> Result<Vec<u8>, ZkError> {
    let mut out = Vec::new();
    vk.serialize_compressed(&mut out)
        .map_err(|e| ZkError::Serialization(format!("{e}")))?;
    Ok(out)
}

pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, ZkError> {
    VerifyingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ZkError::Serialization(format!("{e}")))
}

pub fn serialize_proof(proof: &Proof<Bn254>) -> Result<Vec<u8>, ZkError> {
    let mut out = Vec::new();
    proof
        .serialize_compressed(&mut out)
        .map_err(|e| ZkError::Serialization(format!("{e}")))?;
    Ok(out)
}

pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ZkError> {
    Proof::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ZkError::Serialization(format!("{e}")))
}

/// Bundle a proof with its public statement.
pub fn proof_artifact<const N: usize>(
    proof: &Proof<Bn254>,
    public_set: &RawSet<Fr, N>,
    expected: u64,
) -> Result<ProofArtifact, ZkError> {
    let proof_b64 = base64::engine::general_purpose::STANDARD.encode(serialize_proof(proof)?);
    let public_set = public_set
        .elements()
        .iter()
        .map(FrHex::from_fr)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProofArtifact { proof_b64, public_set, expected })
}

/// Decode and verify a proof artifact.
pub fn verify_artifact<const N: usize>(vk: &VerifyingKey<Bn254>, artifact: &ProofArtifact) -> Result<(), ZkError> {
    let proof_bytes = base64::engine::general_purpose::STANDARD
        .decode(&artifact.proof_b64)
        .map_err(|e| ZkError::Serialization(format!("invalid proof base64: {e}")))?;
    let proof = deserialize_proof(&proof_bytes)?;

    let elems = artifact
        .public_set
        .iter()
        .map(FrHex::to_fr)
        .collect::<Result<Vec<_>, _>>()?;
    let public_set = RawSet::<Fr, N>::from_slice(&elems)?;

    verify_cardinality_proof(vk, &proof, &public_set, artifact.expected)
}
