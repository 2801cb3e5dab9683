use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Validated domain type for a simulated device
///
/// Produced exclusively by the record codec from the stored field set;
/// the raw string representation never crosses the directory boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: String,
    pub online: bool,
}

/// Client-supplied command payload for POST /devices/{id}/command
///
/// `action` is required and must be a string; `parameters` defaults to an
/// empty map when omitted. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

/// Command history entry persisted in the store, newest first
///
/// Immutable once written; entries only age out through the bounded trim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEntry {
    pub action: String,
    pub parameters: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// Receipt returned after a command is accepted and logged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub message: String,
    pub device_id: String,
    pub action_performed: String,
    pub timestamp: DateTime<Utc>,
}
