//! In-memory rule store

use crate::rule::{Condition, ConditionOperator, ConditionValue, FaultRule};
use crate::types::{FaultType, Severity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

/// Holds the set of fault rules for the process lifetime.
///
/// Constructed once at startup and shared behind an `Arc`; there is no
/// ambient global registry. Rules are mutated in place on trigger and
/// never deleted.
pub struct RuleStore {
    rules: RwLock<HashMap<String, FaultRule>>,
}

impl RuleStore {
    /// Create a store seeded with the given rules
    pub fn new(rules: Vec<FaultRule>) -> Self {
        info!("Creating rule store with {} rules", rules.len());
        let rules = rules.into_iter().map(|rule| (rule.id.clone(), rule)).collect();
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Create a store seeded with the built-in rule set
    pub fn with_builtin_rules() -> Self {
        Self::new(builtin_rules())
    }

    /// Insert or replace a rule
    pub fn insert(&self, rule: FaultRule) {
        debug!("Inserting rule {}", rule.id);
        if let Ok(mut rules) = self.rules.write() {
            rules.insert(rule.id.clone(), rule);
        }
    }

    /// Get a rule by id
    pub fn get(&self, rule_id: &str) -> Option<FaultRule> {
        self.rules
            .read()
            .ok()
            .and_then(|rules| rules.get(rule_id).cloned())
    }

    /// All rules, in stable id order
    pub fn all(&self) -> Vec<FaultRule> {
        let mut all: Vec<FaultRule> = self
            .rules
            .read()
            .map(|rules| rules.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Active rules applicable to the given model, in stable id order
    pub fn list_active(&self, model_id: &str) -> Vec<FaultRule> {
        let mut selected: Vec<FaultRule> = self
            .rules
            .read()
            .map(|rules| {
                rules
                    .values()
                    .filter(|rule| rule.is_active && rule.applies_to(model_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        selected.sort_by(|a, b| a.id.cmp(&b.id));
        selected
    }

    /// Record that a rule triggered at the given instant
    pub fn mark_triggered(&self, rule_id: &str, at: DateTime<Utc>) {
        if let Ok(mut rules) = self.rules.write() {
            if let Some(rule) = rules.get_mut(rule_id) {
                rule.last_triggered = Some(at);
            }
        }
    }

    /// Number of rules in the store
    pub fn len(&self) -> usize {
        self.rules.read().map(|rules| rules.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The fixed rule set loaded at process start
fn builtin_rules() -> Vec<FaultRule> {
    vec![
        FaultRule {
            id: "rule-temp-critical".to_string(),
            name: "Critical temperature".to_string(),
            description: "Temperature above safe operating limit".to_string(),
            model_id: None,
            fault_type: FaultType::Environmental,
            severity: Severity::Critical,
            conditions: vec![Condition {
                parameter: "temperature".to_string(),
                operator: ConditionOperator::Gt,
                value: ConditionValue::Scalar(85.0),
                duration_secs: None,
            }],
            is_active: true,
            last_triggered: None,
        },
        FaultRule {
            id: "rule-humidity-range".to_string(),
            name: "Humidity out of range".to_string(),
            description: "Relative humidity outside the controlled band".to_string(),
            model_id: None,
            fault_type: FaultType::Environmental,
            severity: Severity::Medium,
            conditions: vec![Condition {
                parameter: "humidity".to_string(),
                operator: ConditionOperator::Outside,
                value: ConditionValue::Bounds([20.0, 70.0]),
                duration_secs: None,
            }],
            is_active: true,
            last_triggered: None,
        },
        FaultRule {
            id: "rule-vibration-high".to_string(),
            name: "Excessive vibration".to_string(),
            description: "Vibration amplitude above structural tolerance".to_string(),
            model_id: None,
            fault_type: FaultType::Structural,
            severity: Severity::High,
            conditions: vec![Condition {
                parameter: "vibration".to_string(),
                operator: ConditionOperator::Gt,
                value: ConditionValue::Scalar(8.0),
                // Sustained-duration triggering is reserved; see Condition
                duration_secs: Some(30),
            }],
            is_active: true,
            last_triggered: None,
        },
        FaultRule {
            id: "rule-strain-limit".to_string(),
            name: "Strain limit exceeded".to_string(),
            description: "Structural strain beyond the design envelope".to_string(),
            model_id: None,
            fault_type: FaultType::Structural,
            severity: Severity::Critical,
            conditions: vec![Condition {
                parameter: "strain".to_string(),
                operator: ConditionOperator::Gt,
                value: ConditionValue::Scalar(1500.0),
                duration_secs: None,
            }],
            is_active: true,
            last_triggered: None,
        },
        FaultRule {
            id: "rule-voltage-sag".to_string(),
            name: "Supply voltage sag".to_string(),
            description: "Device supply voltage below nominal band".to_string(),
            model_id: None,
            fault_type: FaultType::Performance,
            severity: Severity::Medium,
            conditions: vec![Condition {
                parameter: "voltage".to_string(),
                operator: ConditionOperator::Lt,
                value: ConditionValue::Scalar(11.0),
                duration_secs: None,
            }],
            is_active: true,
            last_triggered: None,
        },
        FaultRule {
            id: "rule-signal-flatline".to_string(),
            name: "Sensor flatline".to_string(),
            description: "Current draw reading stuck at zero".to_string(),
            model_id: None,
            fault_type: FaultType::DataQuality,
            severity: Severity::Low,
            conditions: vec![Condition {
                parameter: "current".to_string(),
                operator: ConditionOperator::Eq,
                value: ConditionValue::Scalar(0.0),
                duration_secs: None,
            }],
            is_active: true,
            last_triggered: None,
        },
    ]
}
