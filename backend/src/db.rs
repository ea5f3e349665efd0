use crate::errors::ApiError;
use crate::models::{EvaluationRecord, Outcome};
use chrono::{DateTime, Utc};
use psi_circuit::types::ProofArtifact;
use sqlx::{sqlite::SqlitePoolOptions, sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

pub type Db = Pool<Sqlite>;

pub async fn connect(db_url: &str) -> Result<Db, ApiError> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|_| ApiError::Internal)
}

pub async fn init_schema(db: &Db) -> Result<(), ApiError> {
    // Append-only ledger of evaluations. Private sets have no column by construction.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS evaluations (
  id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  public_set_json TEXT NOT NULL,
  expected INTEGER NOT NULL,
  outcome TEXT NOT NULL,
  cardinality INTEGER,
  reason TEXT,
  artifact_json TEXT
);
"#,
    )
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn insert_evaluation(db: &Db, rec: &EvaluationRecord) -> Result<(), ApiError> {
    let public_set_json = serde_json::to_string(&rec.public_set).map_err(|_| ApiError::Internal)?;
    let artifact_json = rec
        .artifact
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|_| ApiError::Internal)?;

    sqlx::query(
        r#"INSERT INTO evaluations
           (id, created_at, public_set_json, expected, outcome, cardinality, reason, artifact_json)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(rec.evaluation_id.to_string())
    .bind(rec.created_at.to_rfc3339())
    .bind(public_set_json)
    .bind(rec.expected as i64)
    .bind(rec.outcome.as_str())
    .bind(rec.cardinality.map(|c| c as i64))
    .bind(rec.reason.as_deref())
    .bind(artifact_json)
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

fn row_to_record(row: &SqliteRow, include_artifact: bool) -> Result<EvaluationRecord, ApiError> {
    let id: String = row.get(0);
    let evaluation_id = Uuid::parse_str(&id).map_err(|_| ApiError::Internal)?;

    let created_at: String = row.get(1);
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|_| ApiError::Internal)?
        .with_timezone(&Utc);

    let public_set_json: String = row.get(2);
    let public_set: Vec<u64> = serde_json::from_str(&public_set_json).map_err(|_| ApiError::Internal)?;

    let expected: i64 = row.get(3);
    let outcome: String = row.get(4);
    let outcome = Outcome::parse(&outcome).ok_or(ApiError::Internal)?;
    let cardinality: Option<i64> = row.get(5);
    let reason: Option<String> = row.get(6);
    let artifact_json: Option<String> = row.get(7);

    let artifact = match artifact_json {
        Some(json) if include_artifact => {
            Some(serde_json::from_str::<ProofArtifact>(&json).map_err(|_| ApiError::Internal)?)
        }
        _ => None,
    };

    Ok(EvaluationRecord {
        evaluation_id,
        created_at,
        public_set,
        expected: expected as u64,
        outcome,
        cardinality: cardinality.map(|c| c as u64),
        reason,
        artifact,
    })
}

pub async fn get_evaluation(db: &Db, evaluation_id: Uuid) -> Result<Option<EvaluationRecord>, ApiError> {
    let row = sqlx::query(
        r#"SELECT id, created_at, public_set_json, expected, outcome, cardinality, reason, artifact_json
           FROM evaluations WHERE id = ?"#,
    )
    .bind(evaluation_id.to_string())
    .fetch_optional(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    let Some(row) = row else { return Ok(None); };
    row_to_record(&row, true).map(Some)
}

pub async fn count_evaluations(db: &Db) -> Result<u64, ApiError> {
    let row = sqlx::query(r#"SELECT COUNT(*) AS c FROM evaluations"#)
        .fetch_one(db)
        .await
        .map_err(|_| ApiError::Internal)?;
    let c: i64 = row.get("c");
    Ok(c as u64)
}

pub async fn list_evaluations(
    db: &Db,
    offset: u64,
    limit: u64,
    include_proof: bool,
) -> Result<Vec<EvaluationRecord>, ApiError> {
    let rows = sqlx::query(
        r#"SELECT id, created_at, public_set_json, expected, outcome, cardinality, reason, artifact_json
           FROM evaluations
           ORDER BY created_at, id
           LIMIT ? OFFSET ?"#,
    )
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    rows.iter().map(|row| row_to_record(row, include_proof)).collect()
}
