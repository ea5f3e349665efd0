use crate::errors::ApiError;
use crate::models::{EvaluationRecord, EvaluationRequest, Outcome};
use crate::state::AppState;
use crate::db;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use psi_circuit::constants::SET_CAPACITY;
use psi_circuit::groth16::{proof_artifact, prove_cardinality, verify_cardinality_proof};
use psi_circuit::hash::PoseidonHasher;
use psi_circuit::kernel;
use psi_circuit::types::{Evaluation, ProofArtifact, RawSet};

use ark_bn254::Fr;

type Set = RawSet<Fr, SET_CAPACITY>;

/// Run one evaluation end to end and record it in the ledger.
///
/// Malformed sets (wrong length) are request errors. Kernel rejections are outcomes: they are
/// stored and returned with a reason, and no proof is produced for them.
pub async fn run_evaluation(state: &AppState, req: EvaluationRequest) -> Result<EvaluationRecord, ApiError> {
    let private_set = Set::from_u64s(&req.private_set)?;
    let public_set = Set::from_u64s(&req.public_set)?;
    let expected = req.expected;

    let evaluation_id = Uuid::new_v4();

    let verdict = tokio::task::spawn_blocking(move || {
        kernel::evaluate(&private_set, &public_set, expected, &PoseidonHasher::<Fr>::default())
    })
    .await
    .map_err(|_| ApiError::Internal)?;

    let (outcome, cardinality, reason, artifact) = match verdict {
        Ok(_) => {
            let (evaluation, artifact) = prove(state, private_set, public_set, expected).await?;
            (Outcome::Accepted, Some(evaluation.cardinality.get()), None, Some(artifact))
        }
        Err(e) => {
            let reason = e.rejection_reason().ok_or(ApiError::Internal)?;
            warn!(%evaluation_id, reason, "evaluation rejected");
            (Outcome::Rejected, None, Some(reason.to_string()), None)
        }
    };

    let rec = EvaluationRecord {
        evaluation_id,
        created_at: Utc::now(),
        public_set: req.public_set,
        expected,
        outcome,
        cardinality,
        reason,
        artifact,
    };
    db::insert_evaluation(&state.db, &rec).await?;

    info!(%evaluation_id, outcome = outcome.as_str(), "evaluation recorded");
    Ok(rec)
}

/// Prove an accepted evaluation on a blocking thread.
async fn prove(
    state: &AppState,
    private_set: Set,
    public_set: Set,
    expected: u64,
) -> Result<(Evaluation, ProofArtifact), ApiError> {
    let keys = state.ensure_keys().await?;

    tokio::task::spawn_blocking(move || {
        // Use OS randomness for the proof to avoid deterministic proofs.
        let mut proof_rng = rand::rngs::OsRng;
        let (proof, evaluation) = prove_cardinality::<SET_CAPACITY>(
            &mut proof_rng,
            keys.pk.as_ref(),
            private_set,
            public_set,
            expected,
        )
        .map_err(|_| ApiError::Internal)?;

        // Fail closed if proof doesn't verify.
        verify_cardinality_proof(keys.vk.as_ref(), &proof, &public_set, expected).map_err(|_| ApiError::Internal)?;

        let artifact = proof_artifact(&proof, &public_set, expected).map_err(|_| ApiError::Internal)?;
        Ok::<(Evaluation, ProofArtifact), ApiError>((evaluation, artifact))
    })
    .await
    .map_err(|_| ApiError::Internal)?
}
