//! Diagnostic snapshot construction

use chrono::{DateTime, Duration, Utc};
use fault_rules::SensorType;
use std::collections::HashMap;
use storage::{DiagnosticData, Repository, RootCauseHint};
use tracing::warn;

/// Confidence attached when recent history was available
const HISTORY_CONFIDENCE: f64 = 0.8;
/// Confidence attached when the history lookup failed
const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Build the diagnostic snapshot attached to a new fault.
///
/// Groups the model's readings from the trailing window by sensor type:
/// `parameters` holds the most recent value per type, `trends` the full
/// chronological sequence. A failed history lookup degrades to empty maps
/// with lower confidence; it never fails fault creation.
pub fn build_diagnostics<R: Repository>(
    repository: &R,
    model_id: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> DiagnosticData {
    match repository.readings_for_model(model_id, now - window) {
        Ok(mut readings) => {
            readings.sort_by_key(|reading| reading.timestamp);

            let mut parameters: HashMap<SensorType, f64> = HashMap::new();
            let mut trends: HashMap<SensorType, Vec<f64>> = HashMap::new();
            for reading in readings {
                parameters.insert(reading.sensor_type, reading.value);
                trends.entry(reading.sensor_type).or_default().push(reading.value);
            }

            DiagnosticData {
                parameters,
                trends,
                root_cause: RootCauseHint {
                    summary: "Rule threshold exceeded; review recent telemetry trends".to_string(),
                    confidence: HISTORY_CONFIDENCE,
                },
                resolution_note: None,
            }
        }
        Err(err) => {
            warn!("History lookup for model {} failed, degrading diagnostics: {}", model_id, err);
            DiagnosticData {
                parameters: HashMap::new(),
                trends: HashMap::new(),
                root_cause: RootCauseHint {
                    summary: "Rule threshold exceeded; telemetry history unavailable".to_string(),
                    confidence: DEGRADED_CONFIDENCE,
                },
                resolution_note: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{MemoryRepository, SensorReading};

    fn reading(sensor_type: SensorType, value: f64, at: DateTime<Utc>) -> SensorReading {
        SensorReading {
            model_id: "M1".to_string(),
            device_id: "dev-1".to_string(),
            sensor_type,
            value,
            unit: String::new(),
            timestamp: at,
            coordinates: None,
        }
    }

    #[test]
    fn test_snapshot_groups_by_sensor_type() {
        let repo = MemoryRepository::new();
        let now = Utc::now();
        repo.insert_reading(reading(
            SensorType::Temperature,
            70.0,
            now - Duration::minutes(30),
        ))
        .unwrap();
        repo.insert_reading(reading(
            SensorType::Temperature,
            90.0,
            now - Duration::minutes(5),
        ))
        .unwrap();
        repo.insert_reading(reading(
            SensorType::Vibration,
            3.0,
            now - Duration::minutes(10),
        ))
        .unwrap();
        // Outside the window, must not appear
        repo.insert_reading(reading(
            SensorType::Temperature,
            40.0,
            now - Duration::hours(2),
        ))
        .unwrap();

        let data = build_diagnostics(&repo, "M1", Duration::seconds(3600), now);

        assert_eq!(data.parameters[&SensorType::Temperature], 90.0);
        assert_eq!(data.parameters[&SensorType::Vibration], 3.0);
        assert_eq!(data.trends[&SensorType::Temperature], vec![70.0, 90.0]);
        assert_eq!(data.root_cause.confidence, 0.8);
    }

    #[test]
    fn test_snapshot_empty_model_still_builds() {
        let repo = MemoryRepository::new();
        let data = build_diagnostics(&repo, "M9", Duration::seconds(3600), Utc::now());
        assert!(data.parameters.is_empty());
        assert!(data.trends.is_empty());
        assert_eq!(data.root_cause.confidence, 0.8);
    }
}
