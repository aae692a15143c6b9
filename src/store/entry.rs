use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored value and the expiry-unit instant it stops being live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Entry {
    pub fn new(value: Value, expires_at: Option<u64>) -> Self {
        Self { value, expires_at }
    }

    /// Whether the entry is dead at `now_units`.
    pub fn is_expired(&self, now_units: u64) -> bool {
        self.expires_at.is_some_and(|at| now_units >= at)
    }
}
