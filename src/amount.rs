//! Arithmetic on scenario amounts.
//!
//! Amounts are carried as [`serde_json::Number`] so that integer inputs stay integers in
//! the structured output. Sums fall back to floating point as soon as any operand is a
//! float or the integer sum would overflow.

use serde_json::{Number, Value};

/// Returns the number held by `value`, or `None` for any non-numeric JSON value.
pub fn as_amount(value: &Value) -> Option<&Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

pub fn sum(parts: &[&Number]) -> Option<Number> {
    if let Some(total) = parts
        .iter()
        .try_fold(0i64, |acc, n| n.as_i64().and_then(|v| acc.checked_add(v)))
    {
        return Some(Number::from(total));
    }

    let total: f64 = parts.iter().filter_map(|n| n.as_f64()).sum();
    Number::from_f64(total)
}

/// Exact comparison: integer against integer, otherwise as `f64` with no tolerance.
pub fn amounts_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}
