use std::collections::HashMap;
use thiserror::Error;

use crate::domain::Device;

/// Storage field names for a device record hash
pub const FIELD_NAME: &str = "name";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_ONLINE: &str = "online";

/// Status assumed when the stored record omits the field
const DEFAULT_STATUS: &str = "active";

/// Decoding failure for a stored device record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The record has no fields at all (no such key in the store)
    #[error("device record not found")]
    NotFound,

    /// The record exists but fails validation (data corruption class)
    #[error("invalid device record for '{device_id}': {reason}")]
    Invalid { device_id: String, reason: String },
}

impl DecodeError {
    fn invalid(device_id: &str, reason: impl Into<String>) -> Self {
        DecodeError::Invalid {
            device_id: device_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Decode a raw field map fetched from the store into a validated Device
///
/// The store holds devices as flat string-to-string hashes; this function
/// owns every coercion and validation rule between that representation and
/// the domain type. Pure function of its inputs.
///
/// # Arguments
/// * `device_id` - Identifier embedded in the record key, injected as `id`
/// * `fields` - Raw field mapping as returned by HGETALL
///
/// # Returns
/// * `Ok(Device)` - Record present and valid
/// * `Err(DecodeError::NotFound)` - Empty field map (missing key)
/// * `Err(DecodeError::Invalid)` - Record present but fails validation
pub fn decode_device(
    device_id: &str,
    fields: &HashMap<String, String>,
) -> Result<Device, DecodeError> {
    // HGETALL on a missing key yields an empty map; that is "no such
    // device", never a validation failure.
    if fields.is_empty() {
        return Err(DecodeError::NotFound);
    }

    let name = require_non_empty(device_id, fields, FIELD_NAME)?;
    let device_type = require_non_empty(device_id, fields, FIELD_TYPE)?;

    let status = fields
        .get(FIELD_STATUS)
        .cloned()
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    // Case-insensitive comparison to "true"; anything else (including an
    // absent field) is offline.
    let online = fields
        .get(FIELD_ONLINE)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(Device {
        id: device_id.to_string(),
        name,
        device_type,
        status,
        online,
    })
}

/// Serialize a Device back into its canonical storage field set
///
/// The identifier is not included; it lives in the record key. `online` is
/// written as lowercase "true"/"false".
pub fn encode_device(device: &Device) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert(FIELD_NAME.to_string(), device.name.clone());
    fields.insert(FIELD_TYPE.to_string(), device.device_type.clone());
    fields.insert(FIELD_STATUS.to_string(), device.status.clone());
    fields.insert(
        FIELD_ONLINE.to_string(),
        if device.online { "true" } else { "false" }.to_string(),
    );
    fields
}

fn require_non_empty(
    device_id: &str,
    fields: &HashMap<String, String>,
    field: &str,
) -> Result<String, DecodeError> {
    match fields.get(field) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(DecodeError::invalid(
            device_id,
            format!("field '{}' is empty", field),
        )),
        None => Err(DecodeError::invalid(
            device_id,
            format!("missing field '{}'", field),
        )),
    }
}
