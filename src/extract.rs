//! Discovering position-shaped record lists inside the state document.
//!
//! The upstream document is schema-less and changes across site versions, so
//! there is no fixed path to the position table. Instead an ordered list of
//! signature matchers runs over every node of the tree; a new upstream schema
//! gets a new matcher, not new traversal logic.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::normalize::{self, Position};

/// Structural test applied at every node of the state document.
///
/// `key` is the enclosing object key, when there is one.
pub trait SignatureMatcher {
    fn name(&self) -> &'static str;
    fn matches(&self, key: Option<&str>, value: &Value) -> bool;
}

/// Accepts any array sitting under a key literally named `positions`.
pub struct KeyNameMatcher;

impl SignatureMatcher for KeyNameMatcher {
    fn name(&self) -> &'static str {
        "key-name"
    }

    fn matches(&self, key: Option<&str>, value: &Value) -> bool {
        key == Some("positions") && value.is_array()
    }
}

/// Keys that identify a canonical position record outright.
const EXACT_KEYS: [&str; 3] = ["symbol", "side", "size"];
/// Keys from known exchange payloads (Hyperliquid user state among them).
const HINT_KEYS: [&str; 3] = ["coin", "isLong", "szi"];
/// Number of leading elements whose key sets are sampled.
const SAMPLE_LEN: usize = 3;

/// Accepts non-empty arrays of objects whose sampled key-set union covers all
/// of [`EXACT_KEYS`] or touches any of [`HINT_KEYS`].
pub struct ShapeMatcher;

impl SignatureMatcher for ShapeMatcher {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn matches(&self, _key: Option<&str>, value: &Value) -> bool {
        let Value::Array(items) = value else {
            return false;
        };
        if items.is_empty() || !items.iter().all(Value::is_object) {
            return false;
        }
        let keys = sample_keys(items);
        EXACT_KEYS.iter().all(|k| keys.contains(k)) || HINT_KEYS.iter().any(|k| keys.contains(k))
    }
}

/// Union of the key sets of up to the first [`SAMPLE_LEN`] elements.
pub fn sample_keys(items: &[Value]) -> BTreeSet<&str> {
    let mut keys = BTreeSet::new();
    for item in items.iter().take(SAMPLE_LEN) {
        if let Some(obj) = item.as_object() {
            keys.extend(obj.keys().map(String::as_str));
        }
    }
    keys
}

/// The matcher list applied by [`extract_positions`], in precedence order.
pub fn default_matchers() -> Vec<Box<dyn SignatureMatcher>> {
    vec![Box::new(KeyNameMatcher), Box::new(ShapeMatcher)]
}

/// Collect candidate record lists in pre-order traversal order.
///
/// Every matcher runs at every node, so one node can contribute more than
/// one candidate. Object keys are visited in document order.
pub fn discover_candidates<'a>(
    doc: &'a Value,
    matchers: &[Box<dyn SignatureMatcher>],
) -> Vec<&'a Vec<Value>> {
    let mut found = Vec::new();
    visit(None, doc, matchers, &mut found);
    found
}

fn visit<'a>(
    key: Option<&'a str>,
    value: &'a Value,
    matchers: &[Box<dyn SignatureMatcher>],
    found: &mut Vec<&'a Vec<Value>>,
) {
    if let Value::Array(items) = value {
        for matcher in matchers {
            if matcher.matches(key, value) {
                debug!("{} matcher hit: {} record(s)", matcher.name(), items.len());
                found.push(items);
            }
        }
    }
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                visit(Some(k.as_str()), v, matchers, found);
            }
        }
        Value::Array(items) => {
            for v in items {
                visit(None, v, matchers, found);
            }
        }
        _ => {}
    }
}

/// Extract the cycle's position set from a state document.
///
/// Candidates are tried in discovery order; the first one that normalizes to
/// at least one position wins and all later candidates are ignored. No
/// usable candidate → empty set (soft miss).
pub fn extract_positions(doc: &Value) -> Vec<Position> {
    let matchers = default_matchers();
    for candidate in discover_candidates(doc, &matchers) {
        let positions = normalize::normalize_records(candidate);
        if !positions.is_empty() {
            return positions;
        }
    }
    Vec::new()
}
