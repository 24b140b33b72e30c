//! Rule and condition data model

use crate::types::{FaultType, SensorType, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comparison operator for a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Gt,
    Lt,
    Eq,
    Ne,
    Between,
    Outside,
}

/// Threshold for a condition: a single scalar for gt/lt/eq/ne, or a
/// `[low, high]` pair for between/outside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(f64),
    Bounds([f64; 2]),
}

impl ConditionValue {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            ConditionValue::Scalar(value) => Some(*value),
            ConditionValue::Bounds(_) => None,
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            ConditionValue::Scalar(_) => None,
            ConditionValue::Bounds([low, high]) => Some((*low, *high)),
        }
    }
}

/// One comparison against one sensor parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Logical parameter name, e.g. "temperature"
    pub parameter: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
    /// Reserved: sustained-duration triggering is not evaluated yet.
    /// The field is parsed and carried so rules declaring it keep
    /// round-tripping once a windowed evaluator exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

impl Condition {
    /// Sensor type this condition applies to, if the parameter is known
    pub fn sensor_type(&self) -> Option<SensorType> {
        self.parameter.parse().ok()
    }
}

/// A named, scoped set of OR'd threshold conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRule {
    /// Stable identifier, unique within the store
    pub id: String,
    pub name: String,
    pub description: String,
    /// Restricts the rule to one model; `None` applies to all models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub fault_type: FaultType,
    pub severity: Severity,
    /// Rule triggers if ANY condition matches
    pub conditions: Vec<Condition>,
    pub is_active: bool,
    /// Updated on each trigger; never read back by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<DateTime<Utc>>,
}

impl FaultRule {
    /// Whether this rule applies to readings from the given model
    pub fn applies_to(&self, model_id: &str) -> bool {
        match &self.model_id {
            Some(scoped) => scoped == model_id,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_value_accessors() {
        let scalar = ConditionValue::Scalar(85.0);
        assert_eq!(scalar.scalar(), Some(85.0));
        assert_eq!(scalar.bounds(), None);

        let bounds = ConditionValue::Bounds([10.0, 20.0]);
        assert_eq!(bounds.scalar(), None);
        assert_eq!(bounds.bounds(), Some((10.0, 20.0)));
    }

    #[test]
    fn test_condition_value_deserializes_scalar_and_pair() {
        let scalar: ConditionValue = serde_json::from_str("85.0").unwrap();
        assert_eq!(scalar, ConditionValue::Scalar(85.0));

        let pair: ConditionValue = serde_json::from_str("[10.0, 20.0]").unwrap();
        assert_eq!(pair, ConditionValue::Bounds([10.0, 20.0]));
    }

    #[test]
    fn test_condition_sensor_type_mapping() {
        let condition = Condition {
            parameter: "vibration".to_string(),
            operator: ConditionOperator::Gt,
            value: ConditionValue::Scalar(8.0),
            duration_secs: None,
        };
        assert_eq!(condition.sensor_type(), Some(SensorType::Vibration));

        let unknown = Condition {
            parameter: "warp_field".to_string(),
            ..condition
        };
        assert_eq!(unknown.sensor_type(), None);
    }

    #[test]
    fn test_unscoped_rule_applies_everywhere() {
        let rule = FaultRule {
            id: "r1".to_string(),
            name: "r1".to_string(),
            description: String::new(),
            model_id: None,
            fault_type: FaultType::Performance,
            severity: Severity::Low,
            conditions: Vec::new(),
            is_active: true,
            last_triggered: None,
        };
        assert!(rule.applies_to("M1"));
        assert!(rule.applies_to("M2"));

        let scoped = FaultRule {
            model_id: Some("M2".to_string()),
            ..rule
        };
        assert!(scoped.applies_to("M2"));
        assert!(!scoped.applies_to("M1"));
    }
}
