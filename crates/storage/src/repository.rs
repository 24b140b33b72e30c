//! Repository facade and in-memory implementation

use crate::records::{FaultRecord, FaultStatus, SensorReading};
use crate::StorageError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// Typed facade over the backing document store.
///
/// The engine only relies on these operations; the backing store is an
/// external collaborator and may be eventually consistent. Read-your-writes
/// is assumed within one logical flow, which the in-memory implementation
/// trivially provides.
pub trait Repository: Send + Sync {
    /// Append a sensor reading to the model's history
    fn insert_reading(&self, reading: SensorReading) -> Result<(), StorageError>;

    /// Readings for one model with timestamp >= `since`, oldest first
    fn readings_for_model(
        &self,
        model_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StorageError>;

    /// Readings across all models with timestamp >= `since`, oldest first
    fn readings_since(&self, since: DateTime<Utc>) -> Result<Vec<SensorReading>, StorageError>;

    /// Most recent readings, newest first
    fn recent_readings(&self, limit: usize) -> Result<Vec<SensorReading>, StorageError>;

    /// Persist a new fault document
    fn insert_fault(&self, fault: FaultRecord) -> Result<(), StorageError>;

    /// Fetch one fault by id
    fn fault(&self, fault_id: &str) -> Result<Option<FaultRecord>, StorageError>;

    /// Replace a stored fault document; `NotFound` if absent
    fn update_fault(&self, fault: &FaultRecord) -> Result<(), StorageError>;

    /// Faults in ACTIVE status for one model
    fn active_faults(&self, model_id: &str) -> Result<Vec<FaultRecord>, StorageError>;

    /// Faults filtered by model and status, newest first
    fn faults(
        &self,
        model_id: Option<&str>,
        status: Option<FaultStatus>,
        limit: usize,
    ) -> Result<Vec<FaultRecord>, StorageError>;

    /// Total stored readings
    fn reading_count(&self) -> usize;

    /// Total stored faults
    fn fault_count(&self) -> usize;
}

/// In-memory repository with bounded retention
pub struct MemoryRepository {
    readings: Mutex<VecDeque<SensorReading>>,
    faults: Mutex<Vec<FaultRecord>>,
    max_readings: usize,
    max_faults: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            readings: Mutex::new(VecDeque::with_capacity(10_000)),
            faults: Mutex::new(Vec::with_capacity(1_000)),
            max_readings: 100_000,
            max_faults: 10_000,
        }
    }

    /// Repository with custom retention caps
    pub fn with_capacity(max_readings: usize, max_faults: usize) -> Self {
        Self {
            readings: Mutex::new(VecDeque::new()),
            faults: Mutex::new(Vec::new()),
            max_readings,
            max_faults,
        }
    }

    fn lock_err(err: impl std::fmt::Display) -> StorageError {
        StorageError::Backend(format!("Lock error: {err}"))
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MemoryRepository {
    fn insert_reading(&self, reading: SensorReading) -> Result<(), StorageError> {
        let mut readings = self.readings.lock().map_err(Self::lock_err)?;

        // Enforce retention
        while readings.len() >= self.max_readings {
            readings.pop_front();
        }

        readings.push_back(reading);
        Ok(())
    }

    fn readings_for_model(
        &self,
        model_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StorageError> {
        let readings = self.readings.lock().map_err(Self::lock_err)?;
        Ok(readings
            .iter()
            .filter(|reading| reading.model_id == model_id && reading.timestamp >= since)
            .cloned()
            .collect())
    }

    fn readings_since(&self, since: DateTime<Utc>) -> Result<Vec<SensorReading>, StorageError> {
        let readings = self.readings.lock().map_err(Self::lock_err)?;
        Ok(readings
            .iter()
            .filter(|reading| reading.timestamp >= since)
            .cloned()
            .collect())
    }

    fn recent_readings(&self, limit: usize) -> Result<Vec<SensorReading>, StorageError> {
        let readings = self.readings.lock().map_err(Self::lock_err)?;
        Ok(readings.iter().rev().take(limit).cloned().collect())
    }

    fn insert_fault(&self, fault: FaultRecord) -> Result<(), StorageError> {
        let mut faults = self.faults.lock().map_err(Self::lock_err)?;

        if faults.len() >= self.max_faults {
            faults.remove(0);
        }

        debug!("Inserted fault {}", fault.id);
        faults.push(fault);
        Ok(())
    }

    fn fault(&self, fault_id: &str) -> Result<Option<FaultRecord>, StorageError> {
        let faults = self.faults.lock().map_err(Self::lock_err)?;
        Ok(faults.iter().find(|fault| fault.id == fault_id).cloned())
    }

    fn update_fault(&self, fault: &FaultRecord) -> Result<(), StorageError> {
        let mut faults = self.faults.lock().map_err(Self::lock_err)?;
        match faults.iter_mut().find(|stored| stored.id == fault.id) {
            Some(stored) => {
                *stored = fault.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn active_faults(&self, model_id: &str) -> Result<Vec<FaultRecord>, StorageError> {
        let faults = self.faults.lock().map_err(Self::lock_err)?;
        Ok(faults
            .iter()
            .filter(|fault| fault.model_id == model_id && fault.status == FaultStatus::Active)
            .cloned()
            .collect())
    }

    fn faults(
        &self,
        model_id: Option<&str>,
        status: Option<FaultStatus>,
        limit: usize,
    ) -> Result<Vec<FaultRecord>, StorageError> {
        let faults = self.faults.lock().map_err(Self::lock_err)?;
        Ok(faults
            .iter()
            .rev()
            .filter(|fault| model_id.map_or(true, |id| fault.model_id == id))
            .filter(|fault| status.map_or(true, |s| fault.status == s))
            .take(limit)
            .cloned()
            .collect())
    }

    fn reading_count(&self) -> usize {
        self.readings.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn fault_count(&self) -> usize {
        self.faults.lock().map(|f| f.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DiagnosticData, RootCauseHint};
    use fault_rules::{FaultType, SensorType, Severity};
    use std::collections::HashMap;

    fn reading(model_id: &str, value: f64, timestamp: DateTime<Utc>) -> SensorReading {
        SensorReading {
            model_id: model_id.to_string(),
            device_id: "dev-1".to_string(),
            sensor_type: SensorType::Temperature,
            value,
            unit: "celsius".to_string(),
            timestamp,
            coordinates: None,
        }
    }

    fn fault(id: &str, model_id: &str, status: FaultStatus) -> FaultRecord {
        FaultRecord {
            id: id.to_string(),
            rule_id: "rule-temp-critical".to_string(),
            model_id: model_id.to_string(),
            device_id: "dev-1".to_string(),
            title: "Critical temperature".to_string(),
            description: String::new(),
            severity: Severity::Critical,
            fault_type: FaultType::Environmental,
            status,
            detected_at: Utc::now(),
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
            resolution: None,
            affected_components: vec![SensorType::Temperature],
            diagnostic_data: DiagnosticData {
                parameters: HashMap::new(),
                trends: HashMap::new(),
                root_cause: RootCauseHint {
                    summary: String::new(),
                    confidence: 0.8,
                },
                resolution_note: None,
            },
            recommended_actions: Vec::new(),
        }
    }

    #[test]
    fn test_reading_insert_and_window_query() {
        let repo = MemoryRepository::new();
        let base = Utc::now();

        repo.insert_reading(reading("M1", 70.0, base - chrono::Duration::hours(2)))
            .unwrap();
        repo.insert_reading(reading("M1", 80.0, base)).unwrap();
        repo.insert_reading(reading("M2", 90.0, base)).unwrap();

        let recent = repo
            .readings_for_model("M1", base - chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].value, 80.0);

        let all_recent = repo
            .readings_since(base - chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(all_recent.len(), 2);
    }

    #[test]
    fn test_reading_retention_cap() {
        let repo = MemoryRepository::with_capacity(5, 5);
        let base = Utc::now();
        for i in 0..10 {
            repo.insert_reading(reading("M1", i as f64, base)).unwrap();
        }
        assert_eq!(repo.reading_count(), 5);
    }

    #[test]
    fn test_active_fault_filter() {
        let repo = MemoryRepository::new();
        repo.insert_fault(fault("f1", "M1", FaultStatus::Active)).unwrap();
        repo.insert_fault(fault("f2", "M1", FaultStatus::Resolved)).unwrap();
        repo.insert_fault(fault("f3", "M2", FaultStatus::Active)).unwrap();

        let active = repo.active_faults("M1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "f1");
    }

    #[test]
    fn test_update_fault_requires_existing() {
        let repo = MemoryRepository::new();
        let missing = fault("ghost", "M1", FaultStatus::Active);
        assert!(matches!(
            repo.update_fault(&missing),
            Err(StorageError::NotFound)
        ));

        repo.insert_fault(fault("f1", "M1", FaultStatus::Active)).unwrap();
        let mut updated = fault("f1", "M1", FaultStatus::Resolved);
        updated.resolved_by = Some("operator".to_string());
        repo.update_fault(&updated).unwrap();

        let stored = repo.fault("f1").unwrap().unwrap();
        assert_eq!(stored.status, FaultStatus::Resolved);
    }

    #[test]
    fn test_faults_query_filters_and_limit() {
        let repo = MemoryRepository::new();
        repo.insert_fault(fault("f1", "M1", FaultStatus::Active)).unwrap();
        repo.insert_fault(fault("f2", "M1", FaultStatus::Acknowledged)).unwrap();
        repo.insert_fault(fault("f3", "M2", FaultStatus::Active)).unwrap();

        let m1 = repo.faults(Some("M1"), None, 10).unwrap();
        assert_eq!(m1.len(), 2);

        let active = repo.faults(None, Some(FaultStatus::Active), 10).unwrap();
        assert_eq!(active.len(), 2);

        let limited = repo.faults(None, None, 2).unwrap();
        assert_eq!(limited.len(), 2);
        // Newest first
        assert_eq!(limited[0].id, "f3");
    }
}
