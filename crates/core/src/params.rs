//! Tolerant JSON override helpers.
//!
//! Each helper overwrites `target` only when `params[name]` exists and has the
//! expected JSON type; anything else leaves `target` untouched. They never
//! fail. Range checks happen afterwards in `SessionConfig::validate`.

use serde_json::Value;

/// Overwrites `target` with `params[name]` if it is a JSON number.
pub fn override_f64(params: &Value, name: &str, target: &mut f64) {
    if let Some(v) = params.get(name).and_then(Value::as_f64) {
        *target = v;
    }
}

/// Overwrites `target` with `params[name]` if it is a non-negative integer.
pub fn override_usize(params: &Value, name: &str, target: &mut usize) {
    if let Some(v) = params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
    {
        *target = v;
    }
}

/// Overwrites `target` with `params[name]` if it is a JSON boolean.
pub fn override_bool(params: &Value, name: &str, target: &mut bool) {
    if let Some(v) = params.get(name).and_then(Value::as_bool) {
        *target = v;
    }
}
