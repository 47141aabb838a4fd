use serde::Deserialize;
use serde_json::Value;

use crate::{Call, CallCollection, TriageError, TriageResult};

/// Load calls from a JSON string.
pub fn calls_from_str(json: &str) -> TriageResult<CallCollection> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| TriageError::Json(err.to_string()))?;
    calls_from_value(&value)
}

/// Load calls from either a bare array or an object holding a `calls` array.
///
/// One malformed call rejects the whole load.
pub fn calls_from_value(value: &Value) -> TriageResult<CallCollection> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(obj) => obj
            .get("calls")
            .and_then(Value::as_array)
            .ok_or_else(|| TriageError::Json("expected a `calls` array".to_string()))?,
        _ => {
            return Err(TriageError::Json(
                "expected an array of calls or an object with `calls`".to_string(),
            ))
        }
    };

    let calls = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Call::deserialize(entry).map_err(|err| TriageError::InvalidCall {
                index,
                reason: err.to_string(),
            })
        })
        .collect::<TriageResult<Vec<_>>>()?;

    tracing::debug!(calls = calls.len(), "loaded AI calls");
    Ok(CallCollection::new(calls))
}
