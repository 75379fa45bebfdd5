//! Helpers for reading typed init arguments out of a constructor's
//! `serde_json::Map` payload, with defaults for absent keys.

use cyclesim_common::{EngineError, EngineResult};
use serde_json::{Map, Value};

/// Read `key` as an `f64`, or `default` if absent. An error if present
/// but not a number.
pub fn get_f64(args: &Map<String, Value>, key: &str, default: f64) -> EngineResult<f64> {
    match args.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| EngineError::config(format!("'{key}' must be a number"))),
    }
}

/// Read `key` as a non-empty list of `[value, duration]` pairs, each
/// duration strictly positive.
pub fn get_pairs(args: &Map<String, Value>, key: &str) -> EngineResult<Vec<(f64, f64)>> {
    let arr = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::config(format!("'{key}' must be a list of [value, duration] pairs")))?;
    if arr.is_empty() {
        return Err(EngineError::config(format!("'{key}' must not be empty")));
    }
    arr.iter()
        .map(|entry| {
            let pair = entry
                .as_array()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| {
                    EngineError::config(format!("each entry in '{key}' must be a [value, duration] pair"))
                })?;
            let value = pair[0]
                .as_f64()
                .ok_or_else(|| EngineError::config(format!("'{key}' entry value must be a number")))?;
            let duration = pair[1]
                .as_f64()
                .ok_or_else(|| EngineError::config(format!("'{key}' entry duration must be a number")))?;
            if duration <= 0.0 {
                return Err(EngineError::config(format!(
                    "'{key}' entry duration must be positive"
                )));
            }
            Ok((value, duration))
        })
        .collect()
}
