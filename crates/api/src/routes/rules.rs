//! Rule Routes

use axum::{extract::State, Json};
use fault_rules::FaultRule;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Response for the rules endpoint
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub data: Vec<FaultRule>,
    pub count: usize,
}

/// List configured rules
pub async fn list(State(state): State<Arc<AppState>>) -> Json<RuleResponse> {
    let data = state.rules.all();
    Json(RuleResponse {
        count: data.len(),
        data,
    })
}
