pub mod audit;
pub mod matches;
pub mod players;
pub mod teams;
pub mod tournaments;

use serde::Serialize;
use serde_json::Value;

/// JSON image of a row for the audit trail
pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}
