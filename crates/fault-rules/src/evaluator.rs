//! Single-reading condition evaluation
//!
//! Evaluates one incoming reading against a rule's conditions. The
//! evaluator only sees the current value; `duration_secs` on a condition
//! is reserved for a future windowed variant and has no effect here.

use crate::rule::{Condition, ConditionOperator, FaultRule};
use crate::types::SensorType;

/// Whether a rule triggers for the given reading value.
///
/// OR semantics over the rule's conditions, short-circuiting on the first
/// match. An empty condition list never triggers.
pub fn rule_matches(rule: &FaultRule, sensor_type: SensorType, value: f64) -> bool {
    rule.conditions
        .iter()
        .any(|condition| condition_matches(condition, sensor_type, value))
}

/// Whether a single condition matches the given reading value.
///
/// A condition whose parameter does not map to the reading's sensor type
/// contributes false, as does an operator/threshold arity mismatch.
/// Neither is an error.
pub fn condition_matches(condition: &Condition, sensor_type: SensorType, value: f64) -> bool {
    match condition.sensor_type() {
        Some(expected) if expected == sensor_type => {}
        _ => return false,
    }

    match condition.operator {
        ConditionOperator::Gt => condition
            .value
            .scalar()
            .is_some_and(|threshold| value > threshold),
        ConditionOperator::Lt => condition
            .value
            .scalar()
            .is_some_and(|threshold| value < threshold),
        ConditionOperator::Eq => condition
            .value
            .scalar()
            .is_some_and(|threshold| (value - threshold).abs() <= f64::EPSILON),
        ConditionOperator::Ne => condition
            .value
            .scalar()
            .is_some_and(|threshold| (value - threshold).abs() > f64::EPSILON),
        // Inclusive at both ends
        ConditionOperator::Between => condition
            .value
            .bounds()
            .is_some_and(|(low, high)| value >= low && value <= high),
        ConditionOperator::Outside => condition
            .value
            .bounds()
            .is_some_and(|(low, high)| value < low || value > high),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ConditionValue;
    use crate::types::{FaultType, Severity};
    use proptest::prelude::*;

    fn condition(parameter: &str, operator: ConditionOperator, value: ConditionValue) -> Condition {
        Condition {
            parameter: parameter.to_string(),
            operator,
            value,
            duration_secs: None,
        }
    }

    fn rule_with(conditions: Vec<Condition>) -> FaultRule {
        FaultRule {
            id: "rule-test".to_string(),
            name: "test".to_string(),
            description: String::new(),
            model_id: None,
            fault_type: FaultType::Environmental,
            severity: Severity::High,
            conditions,
            is_active: true,
            last_triggered: None,
        }
    }

    #[test]
    fn test_gt_lt_semantics() {
        let gt = condition(
            "temperature",
            ConditionOperator::Gt,
            ConditionValue::Scalar(85.0),
        );
        assert!(condition_matches(&gt, SensorType::Temperature, 90.0));
        assert!(!condition_matches(&gt, SensorType::Temperature, 85.0));
        assert!(!condition_matches(&gt, SensorType::Temperature, 80.0));

        let lt = condition(
            "voltage",
            ConditionOperator::Lt,
            ConditionValue::Scalar(11.5),
        );
        assert!(condition_matches(&lt, SensorType::Voltage, 11.0));
        assert!(!condition_matches(&lt, SensorType::Voltage, 11.5));
    }

    #[test]
    fn test_eq_ne_semantics() {
        let eq = condition("strain", ConditionOperator::Eq, ConditionValue::Scalar(0.0));
        assert!(condition_matches(&eq, SensorType::Strain, 0.0));
        assert!(!condition_matches(&eq, SensorType::Strain, 0.1));

        let ne = condition("strain", ConditionOperator::Ne, ConditionValue::Scalar(0.0));
        assert!(condition_matches(&ne, SensorType::Strain, 0.1));
        assert!(!condition_matches(&ne, SensorType::Strain, 0.0));
    }

    #[test]
    fn test_between_is_inclusive_at_both_bounds() {
        let between = condition(
            "humidity",
            ConditionOperator::Between,
            ConditionValue::Bounds([30.0, 60.0]),
        );
        assert!(condition_matches(&between, SensorType::Humidity, 30.0));
        assert!(condition_matches(&between, SensorType::Humidity, 45.0));
        assert!(condition_matches(&between, SensorType::Humidity, 60.0));
        assert!(!condition_matches(&between, SensorType::Humidity, 29.9));
        assert!(!condition_matches(&between, SensorType::Humidity, 60.1));
    }

    #[test]
    fn test_outside_excludes_the_bounds_themselves() {
        let outside = condition(
            "humidity",
            ConditionOperator::Outside,
            ConditionValue::Bounds([30.0, 60.0]),
        );
        assert!(!condition_matches(&outside, SensorType::Humidity, 30.0));
        assert!(!condition_matches(&outside, SensorType::Humidity, 60.0));
        assert!(condition_matches(&outside, SensorType::Humidity, 29.9));
        assert!(condition_matches(&outside, SensorType::Humidity, 60.1));
    }

    #[test]
    fn test_sensor_type_mismatch_never_matches() {
        let gt = condition(
            "temperature",
            ConditionOperator::Gt,
            ConditionValue::Scalar(0.0),
        );
        assert!(!condition_matches(&gt, SensorType::Vibration, 100.0));
    }

    #[test]
    fn test_unknown_parameter_never_matches() {
        let gt = condition(
            "warp_field",
            ConditionOperator::Gt,
            ConditionValue::Scalar(0.0),
        );
        assert!(!condition_matches(&gt, SensorType::Temperature, 100.0));
    }

    #[test]
    fn test_arity_mismatch_is_a_non_match() {
        let gt_with_pair = condition(
            "temperature",
            ConditionOperator::Gt,
            ConditionValue::Bounds([10.0, 20.0]),
        );
        assert!(!condition_matches(&gt_with_pair, SensorType::Temperature, 100.0));

        let between_with_scalar = condition(
            "temperature",
            ConditionOperator::Between,
            ConditionValue::Scalar(10.0),
        );
        assert!(!condition_matches(
            &between_with_scalar,
            SensorType::Temperature,
            10.0
        ));
    }

    #[test]
    fn test_rule_or_semantics() {
        let rule = rule_with(vec![
            condition(
                "temperature",
                ConditionOperator::Gt,
                ConditionValue::Scalar(85.0),
            ),
            condition(
                "temperature",
                ConditionOperator::Lt,
                ConditionValue::Scalar(-20.0),
            ),
        ]);

        assert!(rule_matches(&rule, SensorType::Temperature, 90.0));
        assert!(rule_matches(&rule, SensorType::Temperature, -25.0));
        assert!(!rule_matches(&rule, SensorType::Temperature, 20.0));
    }

    #[test]
    fn test_empty_conditions_never_trigger() {
        let rule = rule_with(Vec::new());
        assert!(!rule_matches(&rule, SensorType::Temperature, 1e9));
    }

    proptest! {
        /// `outside` is the exact complement of `between` on finite values.
        #[test]
        fn prop_between_and_outside_are_complements(
            value in -1e6f64..1e6,
            a in -1e6f64..1e6,
            b in -1e6f64..1e6,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let between = condition(
                "pressure",
                ConditionOperator::Between,
                ConditionValue::Bounds([low, high]),
            );
            let outside = condition(
                "pressure",
                ConditionOperator::Outside,
                ConditionValue::Bounds([low, high]),
            );
            prop_assert_ne!(
                condition_matches(&between, SensorType::Pressure, value),
                condition_matches(&outside, SensorType::Pressure, value)
            );
        }
    }
}
