//! Fault Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{FaultRecord, FaultStatus, Repository};

use crate::{ApiError, AppState};

/// Query parameters for the faults endpoint
#[derive(Debug, Deserialize)]
pub struct FaultQuery {
    /// Filter by model
    pub model_id: Option<String>,
    /// Filter by lifecycle status
    pub status: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for the faults endpoint
#[derive(Debug, Serialize)]
pub struct FaultResponse {
    pub data: Vec<FaultRecord>,
    pub count: usize,
}

/// List faults
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FaultQuery>,
) -> Result<Json<FaultResponse>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|raw| raw.parse::<FaultStatus>())
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let data = state
        .repository
        .faults(params.model_id.as_deref(), status, params.limit.min(500))?;

    Ok(Json(FaultResponse {
        count: data.len(),
        data,
    }))
}

/// Body for the acknowledge action
#[derive(Debug, Deserialize)]
pub struct AcknowledgeBody {
    pub actor_id: String,
}

/// Acknowledge a fault
pub async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Path(fault_id): Path<String>,
    Json(body): Json<AcknowledgeBody>,
) -> Result<Json<FaultRecord>, ApiError> {
    let fault = state.engine.acknowledge(&fault_id, &body.actor_id).await?;
    Ok(Json(fault))
}

/// Body for the resolve action
#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub actor_id: String,
    pub resolution: Option<String>,
}

/// Resolve a fault
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(fault_id): Path<String>,
    Json(body): Json<ResolveBody>,
) -> Result<Json<FaultRecord>, ApiError> {
    let fault = state
        .engine
        .resolve(&fault_id, &body.actor_id, body.resolution)
        .await?;
    Ok(Json(fault))
}
