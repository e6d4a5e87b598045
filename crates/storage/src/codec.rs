//! JSON payload format for persisted session snapshots.

use quiz_core::model::SessionSnapshot;

use crate::repository::StorageError;

/// Encode a snapshot as the JSON object stored per exam.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<String, StorageError> {
    serde_json::to_string(snapshot).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a stored payload. Anything other than a JSON object with an array
/// ledger is rejected.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for unparseable or structurally
/// unexpected payloads.
pub fn decode_snapshot(payload: &str) -> Result<SessionSnapshot, StorageError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    if !value.is_object() {
        return Err(StorageError::Serialization(
            "snapshot payload is not an object".into(),
        ));
    }
    serde_json::from_value(value).map_err(|err| StorageError::Serialization(err.to_string()))
}
