//! Fault Rule Engine
//!
//! Defines the fault rule data model, the in-memory rule store, and the
//! single-reading condition evaluator used by the detection engine.

mod evaluator;
mod rule;
mod store;
mod types;

pub use evaluator::{condition_matches, rule_matches};
pub use rule::{Condition, ConditionOperator, ConditionValue, FaultRule};
pub use store::RuleStore;
pub use types::{recommended_actions, FaultType, SensorType, Severity, UnknownParameter};
