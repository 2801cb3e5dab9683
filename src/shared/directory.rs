use redis::aio::ConnectionLike;
use redis::AsyncCommands;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::codec::{decode_device, DecodeError};
use crate::domain::Device;
use crate::store::StoreError;

/// Key namespace for device record hashes
pub const DEVICE_KEY_PREFIX: &str = "device:";

/// Suffix marking per-device command history lists within the namespace
pub const COMMAND_LOG_SUFFIX: &str = ":commands";

/// Page size for incremental SCAN over the device namespace
const SCAN_PAGE_SIZE: usize = 50;

/// Build the record key for a device id
pub fn device_key(device_id: &str) -> String {
    format!("{}{}", DEVICE_KEY_PREFIX, device_id)
}

/// Extract a device id from a scanned key
///
/// Returns `None` for keys outside the record namespace, including the
/// command history lists (`device:<id>:commands`).
pub fn device_id_from_key(key: &str) -> Option<&str> {
    if key.ends_with(COMMAND_LOG_SUFFIX) {
        return None;
    }
    key.strip_prefix(DEVICE_KEY_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Enumerate all device ids known to the store
///
/// Walks the keyspace with incremental cursor-based SCAN pages (never one
/// unbounded listing call), excludes command-log keys, deduplicates, and
/// returns ids sorted for deterministic output.
pub async fn list_device_ids<C>(conn: &mut C) -> Result<Vec<String>, StoreError>
where
    C: ConnectionLike + Send,
{
    let mut ids: BTreeSet<String> = BTreeSet::new();
    let mut cursor: u64 = 0;

    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(format!("{}*", DEVICE_KEY_PREFIX))
            .arg("COUNT")
            .arg(SCAN_PAGE_SIZE)
            .query_async(conn)
            .await?;

        for key in &keys {
            if let Some(id) = device_id_from_key(key) {
                ids.insert(id.to_string());
            }
        }

        cursor = next;
        if cursor == 0 {
            break;
        }
    }

    Ok(ids.into_iter().collect())
}

/// Fetch and decode one device record
///
/// # Returns
/// * `Ok(Some(Device))` - Record present and valid
/// * `Ok(None)` - No such device
/// * `Err(StoreError::InvalidRecord)` - Record present but undecodable
/// * `Err(StoreError::Unavailable)` - Store connectivity failure
pub async fn get_device<C>(conn: &mut C, device_id: &str) -> Result<Option<Device>, StoreError>
where
    C: ConnectionLike + Send + Sync,
{
    let fields: HashMap<String, String> = conn.hgetall(device_key(device_id)).await?;

    match decode_device(device_id, &fields) {
        Ok(device) => Ok(Some(device)),
        Err(DecodeError::NotFound) => Ok(None),
        Err(DecodeError::Invalid { device_id, reason }) => {
            Err(StoreError::InvalidRecord { device_id, reason })
        }
    }
}

/// List all decodable devices
///
/// Composition of id enumeration and per-id fetch. A record that is
/// individually undecodable is logged and skipped so one corrupt entry
/// cannot take down the whole listing; connectivity failures still abort.
pub async fn list_devices<C>(conn: &mut C) -> Result<Vec<Device>, StoreError>
where
    C: ConnectionLike + Send + Sync,
{
    let ids = list_device_ids(conn).await?;
    let mut devices = Vec::with_capacity(ids.len());

    for id in ids {
        match get_device(conn, &id).await {
            Ok(Some(device)) => devices.push(device),
            // Record deleted between scan and fetch
            Ok(None) => {}
            Err(StoreError::InvalidRecord { device_id, reason }) => {
                warn!(
                    device_id = %device_id,
                    reason = %reason,
                    "Skipping invalid device record in listing"
                );
            }
            Err(err) => return Err(err),
        }
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_key() {
        assert_eq!(device_key("d1"), "device:d1");
        assert_eq!(device_key("thermostat-7"), "device:thermostat-7");
    }

    #[test]
    fn test_device_id_from_key_strips_prefix() {
        assert_eq!(device_id_from_key("device:d1"), Some("d1"));
        assert_eq!(device_id_from_key("device:a:b"), Some("a:b"));
    }

    #[test]
    fn test_device_id_from_key_excludes_command_logs() {
        assert_eq!(device_id_from_key("device:d1:commands"), None);
    }

    #[test]
    fn test_device_id_from_key_rejects_foreign_namespaces() {
        assert_eq!(device_id_from_key("session:abc"), None);
        assert_eq!(device_id_from_key("device"), None);
        assert_eq!(device_id_from_key("device:"), None);
    }
}
