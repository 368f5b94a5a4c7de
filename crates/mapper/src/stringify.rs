//! Flattening of trait and property maps into single string values.
//!
//! Woopra only accepts scalar query parameters. Arrays and objects are both
//! encoded as compact JSON text, so `[1,2,3]` becomes `"[1,2,3]"` and
//! `{"sku":"A1"}` becomes `"{\"sku\":\"A1\"}"`. `null` becomes the empty
//! string. Scalars use [`scalar_to_string`].

use std::collections::BTreeMap;

use serde_json::{Number, Value};
use woopra_core::{Fields, MapperResult};

/// Largest integer an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Stringify every value of `fields`, keeping the key set unchanged.
pub fn stringify_nested(fields: &Fields) -> MapperResult<BTreeMap<String, String>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), value_to_string(value)?)))
        .collect()
}

/// Encode one trait/property value.
pub fn value_to_string(value: &Value) -> MapperResult<String> {
    match value {
        Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string(value)?),
        scalar => Ok(scalar_to_string(scalar).unwrap_or_default()),
    }
}

/// Canonical string form of a scalar. `None` for `null`, arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integers print in decimal. Floats print in shortest round-trip form,
/// except integral floats within the exact range, which drop the `.0`.
/// Larger integral floats keep the exponent form (`1e16`).
fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}
