use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status field of a long-running job polled by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Start,
    Partial,
    Complete,
    #[serde(other)]
    Other,
}

impl PollStatus {
    /// Read the `status` field of an arbitrary job payload. A missing or
    /// non-string status reads as `Other`.
    pub fn of(payload: &Value) -> Self {
        match payload.get("status").and_then(Value::as_str) {
            Some("start") => Self::Start,
            Some("partial") => Self::Partial,
            Some("complete") => Self::Complete,
            _ => Self::Other,
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}
