//! ZK layer for private set-intersection cardinality.
//!
//! This crate contains:
//! - A native reference kernel that deduplicates, commits and counts two fixed-capacity sets.
//! - A SNARK circuit constraining the same computation with input-independent shape.
//! - Prover + verifier orchestration.
//! - Serialization helpers for transporting proofs and public inputs.

pub mod circuit;
pub mod constants;
pub mod error;
pub mod groth16;
pub mod hash;
pub mod kernel;
pub mod oracle;
pub mod types;

#[cfg(test)]
mod proptests;
