//! Shared enumerations for sensors, fault categories, and severity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of physical quantity a sensor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
    Pressure,
    Vibration,
    Strain,
    Displacement,
    Voltage,
    Current,
}

impl SensorType {
    /// Canonical parameter name used in rule conditions
    pub fn parameter_name(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Pressure => "pressure",
            SensorType::Vibration => "vibration",
            SensorType::Strain => "strain",
            SensorType::Displacement => "displacement",
            SensorType::Voltage => "voltage",
            SensorType::Current => "current",
        }
    }
}

impl FromStr for SensorType {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" => Ok(SensorType::Temperature),
            "humidity" => Ok(SensorType::Humidity),
            "pressure" => Ok(SensorType::Pressure),
            "vibration" => Ok(SensorType::Vibration),
            "strain" => Ok(SensorType::Strain),
            "displacement" => Ok(SensorType::Displacement),
            "voltage" => Ok(SensorType::Voltage),
            "current" => Ok(SensorType::Current),
            other => Err(UnknownParameter(other.to_string())),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.parameter_name())
    }
}

/// Parameter name that does not map to any sensor type
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown sensor parameter: {0}")]
pub struct UnknownParameter(pub String);

/// Category of a detected fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    Performance,
    Structural,
    Environmental,
    Connectivity,
    DataQuality,
}

/// Fault severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Fixed remediation checklist for a fault category
pub fn recommended_actions(fault_type: FaultType) -> &'static [&'static str] {
    match fault_type {
        FaultType::Performance => &[
            "Review recent load profile for the affected model",
            "Compare output against commissioning baseline",
            "Schedule performance recalibration",
        ],
        FaultType::Structural => &[
            "Dispatch inspection of the affected components",
            "Cross-check strain and displacement history",
            "Restrict operating load until cleared",
        ],
        FaultType::Environmental => &[
            "Verify HVAC and ventilation in the affected zone",
            "Check enclosure sealing and drainage",
            "Confirm ambient readings with a portable sensor",
        ],
        FaultType::Connectivity => &[
            "Check device power and network uplink",
            "Review gateway logs for drop events",
            "Restart the edge device if unreachable",
        ],
        FaultType::DataQuality => &[
            "Validate sensor calibration against reference",
            "Inspect wiring for intermittent contact",
            "Flag the data range for downstream consumers",
        ],
    }
}
