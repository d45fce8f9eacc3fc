//! Canonicalizing raw position records.
//!
//! Field names vary across trader/exchange integrations; the fallback tables
//! below map the known aliases onto one canonical record shape.

use serde_json::{Map, Value};

/// A single open trade, canonicalized from whatever the upstream schema
/// called it. Symbol is non-empty; size is finite and non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: String,
    pub size: f64,
}

/// Symbol aliases across known upstream schemas, in priority order.
const SYMBOL_KEYS: [&str; 5] = ["symbol", "coin", "asset", "token", "name"];
/// Size aliases across known upstream schemas, in priority order.
const SIZE_KEYS: [&str; 5] = ["size", "sz", "positionSize", "szi", "qty"];

/// Map raw records to canonical positions, dropping malformed entries.
/// Order is preserved; the output may be shorter than the input.
pub fn normalize_records(records: &[Value]) -> Vec<Position> {
    records.iter().filter_map(normalize_record).collect()
}

fn normalize_record(record: &Value) -> Option<Position> {
    let obj = record.as_object()?;

    let symbol = first_present(obj, &SYMBOL_KEYS).and_then(coerce_symbol)?;
    if symbol.is_empty() {
        return None;
    }

    let size = first_present(obj, &SIZE_KEYS).and_then(coerce_size)?;
    if size == 0.0 {
        return None;
    }

    Some(Position {
        symbol,
        side: resolve_side(obj),
        size,
    })
}

/// First non-null value among `keys`, in table order.
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| obj.get(*k)).find(|v| !v.is_null())
}

fn coerce_symbol(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers pass through; numeric strings are parsed. Anything else, or a
/// non-finite result, drops the record.
fn coerce_size(value: &Value) -> Option<f64> {
    let size = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    size.is_finite().then_some(size)
}

/// `side` field when usable (booleans convert true→long, false→short), else
/// derived from boolean `isLong`, else `"unknown"`.
fn resolve_side(obj: &Map<String, Value>) -> String {
    match obj.get("side") {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Bool(b)) => return bool_side(*b),
        _ => {}
    }
    match obj.get("isLong") {
        Some(Value::Bool(b)) => bool_side(*b),
        _ => "unknown".to_string(),
    }
}

fn bool_side(is_long: bool) -> String {
    if is_long { "long" } else { "short" }.to_string()
}
