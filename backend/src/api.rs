use crate::db;
use crate::errors::ApiError;
use crate::evaluation::run_evaluation;
use crate::models::*;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use psi_circuit::constants::SET_CAPACITY;
use psi_circuit::groth16::{deserialize_vk, serialize_vk, verify_artifact};

#[derive(Debug, serde::Deserialize)]
pub struct ListEvaluationsParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub include_proof: Option<bool>,
}

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v1/evaluations", post(create_evaluation).get(list_evaluations))
        .route("/api/v1/verify", post(verify))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/evaluations/:id", get(get_evaluation))
        .route("/api/v1/zk/vk", get(get_vk))
        .merge(protected_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(provided_key) = headers.get("X-API-KEY") {
        if provided_key == state.config.api_key.as_str() {
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!("unauthorized access attempt");
    Err(StatusCode::UNAUTHORIZED)
}

async fn create_evaluation(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationRecord>, ApiError> {
    let rec = run_evaluation(&state, req).await?;
    Ok(Json(rec))
}

async fn get_evaluation(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<EvaluationRecord>, ApiError> {
    let Some(rec) = db::get_evaluation(&state.db, id).await? else {
        return Err(ApiError::NotFound("evaluation not found".to_string()));
    };
    Ok(Json(rec))
}

async fn list_evaluations(
    State(state): State<AppState>,
    Query(params): Query<ListEvaluationsParams>,
) -> Result<Json<EvaluationListResponse>, ApiError> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(50).min(500);
    let include_proof = params.include_proof.unwrap_or(false);

    let total = db::count_evaluations(&state.db).await?;
    let evaluations = db::list_evaluations(&state.db, offset, limit, include_proof).await?;

    Ok(Json(EvaluationListResponse {
        offset,
        limit,
        total,
        evaluations,
    }))
}

async fn get_vk(State(state): State<AppState>) -> Result<Json<ZkVkResponse>, ApiError> {
    let keys = state.ensure_keys().await?;
    let vk_bytes = serialize_vk(keys.vk.as_ref()).map_err(|_| ApiError::Internal)?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(vk_bytes);

    Ok(Json(ZkVkResponse {
        curve: "bn254".to_string(),
        proof_system: "groth16".to_string(),
        set_capacity: SET_CAPACITY,
        vk_b64: b64,
    }))
}

async fn verify(State(_state): State<AppState>, Json(req): Json<VerifyRequest>) -> Result<Json<VerifyResponse>, ApiError> {
    let vk_bytes = base64::engine::general_purpose::STANDARD
        .decode(req.vk_b64)
        .map_err(|_| ApiError::BadRequest("invalid vk_b64".to_string()))?;
    let vk = deserialize_vk(&vk_bytes).map_err(|_| ApiError::BadRequest("invalid vk".to_string()))?;

    let ok = verify_artifact::<SET_CAPACITY>(&vk, &req.artifact).is_ok();

    Ok(Json(VerifyResponse { ok }))
}
