//! Condition evaluation stub.

use serde_json::Value;

use super::ConditionEvaluator;

/// Accepts every artifact regardless of its declared conditions.
// TODO: replace with a real predicate parser once the expression grammar for
// the conditions field is settled.
pub struct AlwaysTrue;

impl ConditionEvaluator for AlwaysTrue {
    fn evaluate(&self, _conditions: &[Value]) -> bool {
        true
    }
}
