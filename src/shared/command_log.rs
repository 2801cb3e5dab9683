use redis::aio::ConnectionLike;

use crate::directory::{COMMAND_LOG_SUFFIX, DEVICE_KEY_PREFIX};
use crate::domain::CommandEntry;
use crate::store::StoreError;

/// Maximum number of entries retained per device command history
pub const COMMAND_HISTORY_LIMIT: usize = 100;

/// Build the command history key for a device id
pub fn command_log_key(device_id: &str) -> String {
    format!("{}{}{}", DEVICE_KEY_PREFIX, device_id, COMMAND_LOG_SUFFIX)
}

/// Append a command entry to a device history as one atomic unit
///
/// The serialized entry is prepended (newest first) and the list trimmed
/// to `COMMAND_HISTORY_LIMIT` inside a single MULTI/EXEC transaction: no
/// observer can see the prepend without the trim, concurrent appends never
/// interleave partially, and the list never exceeds the cap.
///
/// Device existence and online state are preconditions enforced by the
/// caller; this function does not re-check them. The timestamp inside the
/// entry is caller-generated.
pub async fn append_command<C>(
    conn: &mut C,
    device_id: &str,
    entry: &CommandEntry,
) -> Result<(), StoreError>
where
    C: ConnectionLike + Send,
{
    let payload = serde_json::to_string(entry)?;
    let key = command_log_key(device_id);

    let _: () = redis::pipe()
        .atomic()
        .lpush(&key, payload)
        .ignore()
        .ltrim(&key, 0, COMMAND_HISTORY_LIMIT as isize - 1)
        .ignore()
        .query_async(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[test]
    fn test_command_log_key() {
        assert_eq!(command_log_key("d1"), "device:d1:commands");
    }

    #[test]
    fn test_command_log_key_is_excluded_from_record_namespace() {
        use crate::directory::device_id_from_key;
        assert_eq!(device_id_from_key(&command_log_key("d1")), None);
    }

    #[test]
    fn test_entry_payload_shape() {
        let mut parameters = HashMap::new();
        parameters.insert("level".to_string(), serde_json::json!(80));

        let entry = CommandEntry {
            action: "set_brightness".to_string(),
            parameters,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        };

        let payload = serde_json::to_string(&entry).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["action"], "set_brightness");
        assert_eq!(parsed["parameters"]["level"], 80);
        assert!(parsed["timestamp"]
            .as_str()
            .unwrap()
            .starts_with("2024-01-15T10:30:00"));
    }
}
