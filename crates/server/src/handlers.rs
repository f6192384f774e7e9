//! Request handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use base64::{engine::general_purpose, Engine as _};
use pharos_core::{Did, Multihash, Query};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Claims query request body.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Multibase-encoded multihashes to resolve.
    pub hashes: Vec<String>,
    /// Space DIDs to scope the query to.
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// Claims query response body.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Base64 CBOR claim archives keyed by claim CID.
    pub claims: BTreeMap<String, String>,
    /// Base64 CBOR shard indexes keyed by hex context identifier.
    pub indexes: BTreeMap<String, String>,
}

fn parse_hash(s: &str) -> ApiResult<Multihash> {
    let (_base, bytes) = cid::multibase::decode(s)
        .map_err(|e| ApiError::BadRequest(format!("invalid multibase hash {s}: {e}")))?;
    Multihash::from_bytes(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid multihash {s}: {e}")))
}

/// POST /v1/claims/query
pub async fn query_claims(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    if request.hashes.is_empty() {
        return Err(ApiError::BadRequest("hashes must not be empty".to_string()));
    }

    let hashes = request
        .hashes
        .iter()
        .map(|s| parse_hash(s))
        .collect::<ApiResult<Vec<_>>>()?;
    let subjects = request
        .subjects
        .iter()
        .map(|s| Did::new(s.clone()).map_err(|e| ApiError::BadRequest(e.to_string())))
        .collect::<ApiResult<Vec<_>>>()?;

    let query = Query::new(hashes).with_subjects(subjects);
    let result = state.service.query(query).await?;

    let mut claims = BTreeMap::new();
    for (claim_cid, claim) in &result.claims {
        let archive = claim
            .to_bytes()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        claims.insert(claim_cid.to_string(), general_purpose::STANDARD.encode(archive));
    }

    let mut indexes = BTreeMap::new();
    for (context_id, index) in &result.indexes {
        let archive = index
            .to_bytes()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        indexes.insert(context_id.to_hex(), general_purpose::STANDARD.encode(archive));
    }

    Ok(Json(QueryResponse { claims, indexes }))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /v1/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
