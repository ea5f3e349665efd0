use chrono::{DateTime, Utc};
use psi_circuit::types::ProofArtifact;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Outcome::Accepted),
            "rejected" => Some(Outcome::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Private set. Used only as a proof witness; never stored, logged or returned.
    pub private_set: Vec<u64>,

    /// Public set, published with the proof.
    pub public_set: Vec<u64>,

    /// Declared intersection cardinality.
    pub expected: u64,
}

/// One evaluation as stored in the ledger and returned by the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation_id: Uuid,
    pub created_at: DateTime<Utc>,

    pub public_set: Vec<u64>,
    pub expected: u64,

    pub outcome: Outcome,

    /// Computed cardinality; present only for accepted evaluations.
    pub cardinality: Option<u64>,

    /// Machine-readable rejection reason (`invalid_input`, `cardinality_mismatch`).
    pub reason: Option<String>,

    /// Proof and public statement. Omitted from listings unless requested (large).
    pub artifact: Option<ProofArtifact>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationListResponse {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    pub evaluations: Vec<EvaluationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ZkVkResponse {
    pub curve: String,
    pub proof_system: String,
    pub set_capacity: usize,
    pub vk_b64: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub vk_b64: String,
    pub artifact: ProofArtifact,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
}
