//! Reading Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use fault_rules::SensorType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{Coordinates, FaultRecord, Repository, SensorReading};

use crate::{ApiError, AppState};

/// Body for reading ingest
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub model_id: String,
    pub device_id: String,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    /// Defaults to the server clock when absent
    pub timestamp: Option<DateTime<Utc>>,
    pub coordinates: Option<Coordinates>,
}

/// Response for reading ingest: the stored reading plus any faults the
/// reading produced (created or reused, without distinction)
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub reading: SensorReading,
    pub faults: Vec<FaultRecord>,
}

/// Ingest one reading and run detection on it
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let reading = SensorReading {
        model_id: body.model_id,
        device_id: body.device_id,
        sensor_type: body.sensor_type,
        value: body.value,
        unit: body.unit,
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
        coordinates: body.coordinates,
    };

    state.repository.insert_reading(reading.clone())?;
    let faults = state.engine.handle_reading(&reading).await?;

    Ok((StatusCode::CREATED, Json(IngestResponse { reading, faults })))
}

/// Query parameters for the readings endpoint
#[derive(Debug, Deserialize)]
pub struct ReadingQuery {
    /// Filter by model
    pub model_id: Option<String>,
    /// Return readings at or after this timestamp
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Response for the readings endpoint
#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub data: Vec<SensorReading>,
    pub meta: ReadingMeta,
}

#[derive(Debug, Serialize)]
pub struct ReadingMeta {
    pub count: usize,
    pub limit: usize,
}

/// List readings, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingQuery>,
) -> Result<Json<ReadingResponse>, ApiError> {
    let limit = params.limit.min(1000);

    let mut data = match (&params.model_id, params.since) {
        (None, None) => state.repository.recent_readings(limit)?,
        (model_id, since) => {
            // Window queries come back oldest first; flip them so every
            // branch keeps the newest matches when the limit applies.
            let since = since.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let mut readings = match model_id {
                Some(model_id) => state.repository.readings_for_model(model_id, since)?,
                None => state.repository.readings_since(since)?,
            };
            readings.reverse();
            readings
        }
    };
    data.truncate(limit);

    Ok(Json(ReadingResponse {
        meta: ReadingMeta {
            count: data.len(),
            limit,
        },
        data,
    }))
}
