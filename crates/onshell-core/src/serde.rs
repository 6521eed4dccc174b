//! Canonical JSON for digests, plus the JSON and YAML readers used for model cards and options.

use ::serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, OnShellError};

fn codec_error(code: &str, err: impl ToString) -> OnShellError {
    OnShellError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Rewrites every object of `value` with its keys in sorted order.
fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, mut entry) in entries {
                sort_keys(&mut entry);
                map.insert(key, entry);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Serializes `value` to compact JSON with sorted object keys.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, OnShellError> {
    let mut tree = serde_json::to_value(value).map_err(|err| codec_error("json-encode", err))?;
    sort_keys(&mut tree);
    serde_json::to_vec(&tree).map_err(|err| codec_error("json-write", err))
}

/// Decodes JSON bytes.
pub fn from_json_slice<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, OnShellError> {
    serde_json::from_slice(data).map_err(|err| codec_error("json-read", err))
}

/// Decodes a YAML document.
pub fn from_yaml_str<T: for<'de> Deserialize<'de>>(data: &str) -> Result<T, OnShellError> {
    serde_yaml::from_str(data).map_err(|err| codec_error("yaml-read", err))
}
