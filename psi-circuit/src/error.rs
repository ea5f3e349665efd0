use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which side of the intersection a set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetRole {
    /// Witness-only set held by the prover.
    Private,
    /// Set published alongside the proof.
    Public,
}

impl fmt::Display for SetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetRole::Private => f.write_str("private"),
            SetRole::Public => f.write_str("public"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ZkError {
    #[error("{set} set holds the sentinel value at slot {index}")]
    InvalidInput { set: SetRole, index: usize },

    #[error("cardinality mismatch: expected {expected}, computed {computed}")]
    CardinalityMismatch { expected: u64, computed: u64 },

    #[error("set capacity exceeded: capacity {capacity}, got {got} values")]
    CapacityExceeded { capacity: usize, got: usize },

    #[error("invalid set length: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("proof verification failed")]
    VerificationFailed,

    #[error("arkworks error: {0}")]
    Ark(String),
}

impl ZkError {
    /// Stable machine-readable tag for errors that reject an evaluation.
    ///
    /// Returns `None` for errors that are failures of the proving layer rather than outcomes of
    /// the kernel.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            ZkError::InvalidInput { .. } => Some("invalid_input"),
            ZkError::CardinalityMismatch { .. } => Some("cardinality_mismatch"),
            _ => None,
        }
    }
}
