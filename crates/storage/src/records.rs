//! Stored record types

use chrono::{DateTime, Utc};
use fault_rules::{FaultType, SensorType, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geographic or model-local position of a reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One sensor measurement as received from a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub model_id: String,
    pub device_id: String,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Lifecycle state of a detected fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultStatus {
    Active,
    Acknowledged,
    Resolved,
    FalsePositive,
}

impl FaultStatus {
    /// Resolved and false-positive faults never return to active
    pub fn is_terminal(&self) -> bool {
        matches!(self, FaultStatus::Resolved | FaultStatus::FalsePositive)
    }
}

impl std::str::FromStr for FaultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(FaultStatus::Active),
            "acknowledged" => Ok(FaultStatus::Acknowledged),
            "resolved" => Ok(FaultStatus::Resolved),
            "false_positive" => Ok(FaultStatus::FalsePositive),
            other => Err(format!("unknown fault status: {other}")),
        }
    }
}

/// Root-cause placeholder attached to the diagnostic snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootCauseHint {
    pub summary: String,
    /// 0.8 when history was available at creation, 0.5 when it was not
    pub confidence: f64,
}

/// Point-in-time summary of recent sensor history for a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticData {
    /// Most recent value per sensor type within the trailing window
    pub parameters: HashMap<SensorType, f64>,
    /// Chronological value sequence per sensor type within the window
    pub trends: HashMap<SensorType, Vec<f64>>,
    pub root_cause: RootCauseHint,
    /// Free-text note attached when the fault is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

/// A fault raised by the detection engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRecord {
    pub id: String,
    pub rule_id: String,
    pub model_id: String,
    pub device_id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub fault_type: FaultType,
    pub status: FaultStatus,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Sensor types that triggered the fault
    pub affected_components: Vec<SensorType>,
    pub diagnostic_data: DiagnosticData,
    pub recommended_actions: Vec<String>,
}
