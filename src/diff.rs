//! Snapshot indexing and the three-way position diff.

use std::collections::BTreeMap;

use crate::normalize::Position;

/// Snapshot of open positions keyed by `symbol:side`, mapped to size.
///
/// A `BTreeMap` so iteration — and therefore delta ordering — is
/// lexicographic by key and reproducible across runs.
pub type SnapshotIndex = BTreeMap<String, f64>;

/// Size differences at or below this are treated as unchanged.
pub const DEFAULT_SIZE_TOLERANCE: f64 = 1e-9;

/// Composite index key for a position.
pub fn position_key(symbol: &str, side: &str) -> String {
    format!("{symbol}:{side}")
}

/// Index a position list. Duplicate keys within one list are last-write-wins.
pub fn build_index(positions: &[Position]) -> SnapshotIndex {
    positions
        .iter()
        .map(|p| (position_key(&p.symbol, &p.side), p.size))
        .collect()
}

/// The three-way delta between two snapshots.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Delta {
    /// Keys present now but not before, with current size.
    pub opened: Vec<(String, f64)>,
    /// Keys present before but not now, with last known size.
    pub closed: Vec<(String, f64)>,
    /// Keys present in both with a size change beyond tolerance:
    /// `(key, old, new)`.
    pub resized: Vec<(String, f64, f64)>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.opened.is_empty() && self.closed.is_empty() && self.resized.is_empty()
    }
}

/// Diff `previous` against `current` under a size-equality tolerance.
///
/// Unchanged keys produce no event, so diffing an index against itself is a
/// no-op. Each list follows the key order of the index it was derived from.
pub fn diff_indices(previous: &SnapshotIndex, current: &SnapshotIndex, tolerance: f64) -> Delta {
    let mut delta = Delta::default();

    for (key, &size) in current {
        match previous.get(key) {
            None => delta.opened.push((key.clone(), size)),
            Some(&prev_size) => {
                if (size - prev_size).abs() > tolerance {
                    delta.resized.push((key.clone(), prev_size, size));
                }
            }
        }
    }

    for (key, &prev_size) in previous {
        if !current.contains_key(key) {
            delta.closed.push((key.clone(), prev_size));
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn index(entries: &[(&str, f64)]) -> SnapshotIndex {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn position(symbol: &str, side: &str, size: f64) -> Position {
        Position {
            symbol: symbol.to_string(),
            side: side.to_string(),
            size,
        }
    }

    // ── build_index ────────────────────────────────────────────────

    #[test]
    fn index_keys_join_symbol_and_side() {
        let idx = build_index(&[position("BTC", "long", 1.5)]);
        assert!(approx_eq(idx["BTC:long"], 1.5));
    }

    #[test]
    fn duplicate_keys_are_last_write_wins() {
        let idx = build_index(&[
            position("BTC", "long", 1.0),
            position("BTC", "long", 2.0),
        ]);
        assert_eq!(idx.len(), 1);
        assert!(approx_eq(idx["BTC:long"], 2.0));
    }

    // ── diff_indices ───────────────────────────────────────────────

    #[test]
    fn diff_against_self_is_empty() {
        let idx = index(&[("BTC:long", 1.5), ("ETH:short", 2.0)]);
        assert!(diff_indices(&idx, &idx, DEFAULT_SIZE_TOLERANCE).is_empty());
    }

    #[test]
    fn diff_of_two_empty_indices_is_empty() {
        let empty = SnapshotIndex::new();
        assert!(diff_indices(&empty, &empty, DEFAULT_SIZE_TOLERANCE).is_empty());
    }

    #[test]
    fn opened_closed_resized() {
        let prev = index(&[("BTC:long", 1.0), ("ETH:short", 2.0)]);
        let cur = index(&[("BTC:long", 3.0), ("SOL:long", 4.0)]);
        let delta = diff_indices(&prev, &cur, DEFAULT_SIZE_TOLERANCE);
        assert_eq!(delta.opened, vec![("SOL:long".to_string(), 4.0)]);
        assert_eq!(delta.closed, vec![("ETH:short".to_string(), 2.0)]);
        assert_eq!(delta.resized, vec![("BTC:long".to_string(), 1.0, 3.0)]);
    }

    #[test]
    fn changes_within_tolerance_are_silent() {
        let prev = index(&[("BTC:long", 10.0)]);
        assert!(diff_indices(&prev, &index(&[("BTC:long", 10.4)]), 0.5).is_empty());

        let delta = diff_indices(&prev, &index(&[("BTC:long", 10.6)]), 0.5);
        assert_eq!(delta.resized, vec![("BTC:long".to_string(), 10.0, 10.6)]);
    }

    #[test]
    fn default_tolerance_boundary() {
        let prev = index(&[("BTC:long", 10.0)]);

        let cur = index(&[("BTC:long", 10.0 + 4e-10)]);
        assert!(diff_indices(&prev, &cur, DEFAULT_SIZE_TOLERANCE).is_empty());

        let cur = index(&[("BTC:long", 10.0 + 1e-8)]);
        let delta = diff_indices(&prev, &cur, DEFAULT_SIZE_TOLERANCE);
        assert_eq!(delta.resized.len(), 1);
        assert!(approx_eq(delta.resized[0].1, 10.0));
        assert!(approx_eq(delta.resized[0].2, 10.00000001));
    }

    #[test]
    fn lists_follow_lexicographic_key_order() {
        let prev = index(&[("C:long", 1.0), ("A:long", 1.0)]);
        let cur = index(&[("D:long", 1.0), ("B:long", 1.0), ("A:long", 2.0)]);
        let delta = diff_indices(&prev, &cur, DEFAULT_SIZE_TOLERANCE);
        let opened: Vec<&str> = delta.opened.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(opened, ["B:long", "D:long"]);
    }

    // ── full pipeline: markup → delta ──────────────────────────────

    #[test]
    fn end_to_end_cycle() {
        let html = format!(
            r#"<script id="__NEXT_DATA__">{}</script>"#,
            json!({
                "props": {"pageProps": {"positions": [
                    {"symbol": "SOL", "side": "long", "size": 150},
                    {"symbol": "AVAX", "side": "short", "size": 20}
                ]}}
            })
        );
        let doc = crate::page::locate_embedded_state(&html).expect("blob located");
        let positions = crate::extract::extract_positions(&doc);
        let current = build_index(&positions);
        assert!(approx_eq(current["SOL:long"], 150.0));
        assert!(approx_eq(current["AVAX:short"], 20.0));

        let previous = index(&[("SOL:long", 100.0)]);
        let delta = diff_indices(&previous, &current, DEFAULT_SIZE_TOLERANCE);
        assert_eq!(delta.opened, vec![("AVAX:short".to_string(), 20.0)]);
        assert!(delta.closed.is_empty());
        assert_eq!(delta.resized, vec![("SOL:long".to_string(), 100.0, 150.0)]);
    }
}
