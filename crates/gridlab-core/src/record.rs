//! Persisted pairing of a specification with its experiment result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, LabError};
use crate::value::{map_to_json, TaggedValue, Value};

/// One concrete parameter assignment to be executed.
pub type Specification = BTreeMap<String, Value>;

/// Result mapping produced by an experiment; opaque to the engine.
pub type ResultMap = BTreeMap<String, Value>;

/// Durable pairing of a specification with the result it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The specification that was executed.
    pub specification: Specification,
    /// The result the experiment returned for it.
    pub result: ResultMap,
}

/// On-disk format chosen for a single record.
///
/// The two formats are distinguished by file extension so resume logic can
/// locate and parse each record without pre-knowledge of which was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Primary human-readable format.
    Json,
    /// Secondary binary fallback for payloads JSON cannot represent.
    Binary,
}

impl RecordFormat {
    /// File extension associated with the format.
    pub fn extension(&self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Binary => "bin",
        }
    }
}

/// Serializes a record to pretty-printed JSON bytes.
///
/// Fails with a serde-family error when either mapping holds a value JSON
/// cannot represent; persistence then falls back to the binary codec.
pub fn record_to_json_bytes(record: &Record) -> Result<Vec<u8>, LabError> {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "specification".to_string(),
        map_to_json(&record.specification)?,
    );
    payload.insert("result".to_string(), map_to_json(&record.result)?);
    serde_json::to_vec_pretty(&serde_json::Value::Object(payload))
        .map_err(|err| LabError::Serde(ErrorInfo::new("record-json-encode", err.to_string())))
}

/// Restores a record from JSON bytes.
pub fn record_from_json_slice(data: &[u8]) -> Result<Record, LabError> {
    serde_json::from_slice(data)
        .map_err(|err| LabError::Serde(ErrorInfo::new("record-json-decode", err.to_string())))
}

/// Bincode-friendly mirror carrying explicit variant tags.
#[derive(Serialize, Deserialize)]
struct BinRecord {
    specification: BTreeMap<String, TaggedValue>,
    result: BTreeMap<String, TaggedValue>,
}

fn tag_map(map: &BTreeMap<String, Value>) -> BTreeMap<String, TaggedValue> {
    map.iter()
        .map(|(key, value)| (key.clone(), value.into()))
        .collect()
}

fn untag_map(map: BTreeMap<String, TaggedValue>) -> BTreeMap<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key, value.into()))
        .collect()
}

/// Serializes a record to the compact binary fallback representation.
pub fn record_to_binary_bytes(record: &Record) -> Result<Vec<u8>, LabError> {
    let mirror = BinRecord {
        specification: tag_map(&record.specification),
        result: tag_map(&record.result),
    };
    bincode::serialize(&mirror)
        .map_err(|err| LabError::Serde(ErrorInfo::new("record-bin-encode", err.to_string())))
}

/// Restores a record from its binary fallback representation.
pub fn record_from_binary_slice(data: &[u8]) -> Result<Record, LabError> {
    let mirror: BinRecord = bincode::deserialize(data)
        .map_err(|err| LabError::Serde(ErrorInfo::new("record-bin-decode", err.to_string())))?;
    Ok(Record {
        specification: untag_map(mirror.specification),
        result: untag_map(mirror.result),
    })
}
