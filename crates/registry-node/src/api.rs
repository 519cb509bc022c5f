use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use registry_core::{Block, ChainStore, ClaimError, Registry, Star, StarClaim};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub type SharedRegistry = Arc<Registry<Box<dyn ChainStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Height {
    pub height: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Challenge {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub star: Star,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BlockValidity {
    pub height: u64,
    pub valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainReport {
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Claim(ClaimError),
    Internal(String),
}

impl From<ClaimError> for ApiError {
    fn from(e: ClaimError) -> Self {
        Self::Claim(e)
    }
}

fn claim_status(e: &ClaimError) -> StatusCode {
    match e {
        ClaimError::InvalidAddress(_)
        | ClaimError::MalformedMessage(_)
        | ClaimError::InvalidTimestamp(_)
        | ClaimError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        ClaimError::AddressMismatch { .. } => StatusCode::FORBIDDEN,
        ClaimError::ChallengeExpired { .. } => StatusCode::REQUEST_TIMEOUT,
        ClaimError::SignatureInvalid => StatusCode::UNAUTHORIZED,
        ClaimError::Commit(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Claim(e) => (claim_status(&e), e.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/chain/height", get(chain_height))
        .route("/block/height/{height}", get(block_by_height))
        .route("/block/hash/{hash}", get(block_by_hash))
        .route("/block/validate/{height}", get(validate_block))
        .route("/requestValidation", post(request_validation))
        .route("/submitstar", post(submit_star))
        .route("/blocks/{address}", get(stars_by_address))
        .route("/validate", get(validate_chain))
        .with_state(state)
}

async fn chain_height(State(state): State<AppState>) -> Json<Height> {
    Json(Height {
        height: state.registry.height(),
    })
}

async fn block_by_height(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    state
        .registry
        .block_by_height(height)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("block #{height}")))
}

async fn block_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<Block>, ApiError> {
    state
        .registry
        .block_by_hash(&hash)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("block {hash}")))
}

async fn validate_block(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> Json<BlockValidity> {
    Json(BlockValidity {
        height,
        valid: state.registry.validate_block(height),
    })
}

async fn request_validation(
    State(state): State<AppState>,
    Json(req): Json<ChallengeRequest>,
) -> Result<Json<Challenge>, ApiError> {
    let message = state.registry.request_challenge(&req.address)?;
    Ok(Json(Challenge { message }))
}

/// Commits hold the registry write lock and may fsync, so they run off the
/// async workers.
async fn submit_star(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<Block>, ApiError> {
    let registry = state.registry.clone();
    let address = req.address.clone();
    let result = tokio::task::spawn_blocking(move || {
        registry.submit_claim(&req.address, &req.message, &req.signature, req.star)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("claim task failed: {e}")))?;
    result.map(Json).map_err(|e| {
        warn!("claim from {address} rejected: {e}");
        ApiError::from(e)
    })
}

async fn stars_by_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<Vec<StarClaim>> {
    Json(state.registry.stars_by_address(&address))
}

async fn validate_chain(State(state): State<AppState>) -> Json<ChainReport> {
    Json(ChainReport {
        errors: state.registry.validate_chain(),
    })
}
