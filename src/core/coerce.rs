use ethers::types::U256;
use num_bigint::BigUint;
use serde_json::Value;
use thiserror::Error;

/// Largest integer a JSON number can carry without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot coerce {0} to a number")]
pub struct CoerceError(pub String);

/// Coerce a fetched JSON value to a float. Strings parse (trimmed),
/// booleans map to 1/0, anything else fails.
pub fn coerce_to_f64(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| CoerceError(value.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoerceError(format!("\"{s}\""))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(CoerceError(other.to_string())),
    }
}

/// Render a float back as a JSON number. Whole-valued results render as
/// integers; non-finite values have no JSON representation and yield None.
pub fn number_value(x: f64) -> Option<Value> {
    if !x.is_finite() {
        return None;
    }
    if x.fract() == 0.0 && x.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(x as i64));
    }
    serde_json::Number::from_f64(x).map(Value::Number)
}

/// Lossy conversion of a chain integer for post-scaling float arithmetic.
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Exact conversion of a chain integer into an arbitrary-precision one.
pub fn biguint_from_u256(value: U256) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}
