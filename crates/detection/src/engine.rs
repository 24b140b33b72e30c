//! Detection engine implementation

use crate::diagnostics::build_diagnostics;
use crate::DetectionError;
use chrono::{Duration, Utc};
use fault_rules::{recommended_actions, rule_matches, FaultRule, RuleStore};
use notifier::FaultNotifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storage::{FaultRecord, FaultStatus, Repository, SensorReading};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Trailing telemetry window attached to new faults (seconds)
    pub history_window_secs: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            history_window_secs: 3600,
        }
    }
}

/// Drives the fault lifecycle for incoming readings.
///
/// One instance per process, shared behind an `Arc`. Readings may be
/// handled concurrently; creation for a given (rule, model) pair is
/// serialized through a keyed lock so the check-then-create dedup cannot
/// race itself into duplicate active faults. Lock entries live only while
/// some task holds them, so the map stays empty between readings.
pub struct DetectionEngine<R, N> {
    rules: Arc<RuleStore>,
    repository: Arc<R>,
    notifier: Arc<N>,
    config: DetectionConfig,
    creation_locks: Mutex<HashMap<(String, String), Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: Repository, N: FaultNotifier> DetectionEngine<R, N> {
    pub fn new(
        rules: Arc<RuleStore>,
        repository: Arc<R>,
        notifier: Arc<N>,
        config: DetectionConfig,
    ) -> Self {
        info!("Creating detection engine with {} rules", rules.len());
        Self {
            rules,
            repository,
            notifier,
            config,
            creation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one reading: evaluate active rules and create or reuse a
    /// fault per triggered rule.
    ///
    /// The returned list mixes newly created and reused faults without
    /// distinction, matching the ingest contract. The only caller-visible
    /// failure is a fault document that could not be persisted.
    pub async fn handle_reading(
        &self,
        reading: &SensorReading,
    ) -> Result<Vec<FaultRecord>, DetectionError> {
        let mut faults = Vec::new();
        for rule in self.rules.list_active(&reading.model_id) {
            if !rule_matches(&rule, reading.sensor_type, reading.value) {
                continue;
            }
            debug!("Rule {} triggered for model {}", rule.id, reading.model_id);
            faults.push(self.resolve_or_create(&rule, reading).await?);
        }
        Ok(faults)
    }

    /// Reuse the existing active fault for (rule, model) or create a new one
    async fn resolve_or_create(
        &self,
        rule: &FaultRule,
        reading: &SensorReading,
    ) -> Result<FaultRecord, DetectionError> {
        let key = (rule.id.clone(), reading.model_id.clone());
        let lock = self.creation_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.resolve_or_create_locked(rule, reading).await
        };
        drop(lock);
        self.release_creation_lock(&key);
        result
    }

    async fn resolve_or_create_locked(
        &self,
        rule: &FaultRule,
        reading: &SensorReading,
    ) -> Result<FaultRecord, DetectionError> {
        // Dedup: at most one active fault per (rule, model). A failed
        // lookup degrades to "none seen" rather than blocking creation.
        let active = match self.repository.active_faults(&reading.model_id) {
            Ok(active) => active,
            Err(err) => {
                warn!("Active-fault lookup for model {} failed: {}", reading.model_id, err);
                Vec::new()
            }
        };
        if let Some(existing) = active.into_iter().find(|fault| fault.rule_id == rule.id) {
            debug!(
                "Suppressing duplicate of fault {} (rule {}, model {})",
                existing.id, rule.id, reading.model_id
            );
            return Ok(existing);
        }

        let now = Utc::now();
        let fault = FaultRecord {
            id: Uuid::new_v4().to_string(),
            rule_id: rule.id.clone(),
            model_id: reading.model_id.clone(),
            device_id: reading.device_id.clone(),
            title: rule.name.clone(),
            description: rule.description.clone(),
            severity: rule.severity,
            fault_type: rule.fault_type,
            status: FaultStatus::Active,
            detected_at: now,
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
            resolution: None,
            affected_components: vec![reading.sensor_type],
            diagnostic_data: build_diagnostics(
                self.repository.as_ref(),
                &reading.model_id,
                Duration::seconds(self.config.history_window_secs),
                now,
            ),
            recommended_actions: recommended_actions(rule.fault_type)
                .iter()
                .map(|action| action.to_string())
                .collect(),
        };

        // Phase 1: persist, or the whole operation fails
        self.repository.insert_fault(fault.clone())?;
        self.rules.mark_triggered(&rule.id, now);
        info!(
            "Fault {} created (rule {}, model {}, severity {:?})",
            fault.id, rule.id, fault.model_id, fault.severity
        );

        // Phase 2: best-effort notification
        if let Err(err) = self.notifier.publish_fault(&fault).await {
            warn!("Notification for fault {} failed: {}", fault.id, err);
        }

        Ok(fault)
    }

    /// Mark a fault acknowledged.
    ///
    /// Repeated acknowledgement overwrites the actor and timestamp.
    /// Terminal faults are returned unchanged.
    pub async fn acknowledge(
        &self,
        fault_id: &str,
        actor_id: &str,
    ) -> Result<FaultRecord, DetectionError> {
        let mut fault = self
            .repository
            .fault(fault_id)?
            .ok_or_else(|| DetectionError::NotFound(fault_id.to_string()))?;

        if fault.status.is_terminal() {
            return Ok(fault);
        }

        fault.status = FaultStatus::Acknowledged;
        fault.acknowledged_at = Some(Utc::now());
        fault.acknowledged_by = Some(actor_id.to_string());
        self.repository.update_fault(&fault)?;
        info!("Fault {} acknowledged by {}", fault.id, actor_id);
        Ok(fault)
    }

    /// Mark a fault resolved, optionally attaching a resolution note.
    ///
    /// Idempotent: resolving an already-resolved fault overwrites the
    /// metadata and succeeds. False positives stay as classified.
    pub async fn resolve(
        &self,
        fault_id: &str,
        actor_id: &str,
        resolution: Option<String>,
    ) -> Result<FaultRecord, DetectionError> {
        let mut fault = self
            .repository
            .fault(fault_id)?
            .ok_or_else(|| DetectionError::NotFound(fault_id.to_string()))?;

        if fault.status == FaultStatus::FalsePositive {
            return Ok(fault);
        }

        fault.status = FaultStatus::Resolved;
        fault.resolved_at = Some(Utc::now());
        fault.resolved_by = Some(actor_id.to_string());
        if let Some(text) = resolution {
            fault.diagnostic_data.resolution_note = Some(text.clone());
            fault.resolution = Some(text);
        }
        self.repository.update_fault(&fault)?;
        info!("Fault {} resolved by {}", fault.id, actor_id);
        Ok(fault)
    }

    fn creation_lock(&self, key: &(String, String)) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.creation_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.entry(key.clone()).or_default().clone()
    }

    /// Drop the keyed lock entry once no task holds it.
    ///
    /// A strong count of 1 means only the map's handle remains; any
    /// concurrent waiter took its clone under the map mutex, so the
    /// count check cannot race with a new acquisition.
    fn release_creation_lock(&self, key: &(String, String)) {
        let mut locks = match self.creation_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }
}
