//! Rendering a delta (and optional heartbeat summary) into one message.
//!
//! Fixed section layout: header with the trader URL, then scheduled report,
//! opened, closed, and resized lists — whichever are non-empty.

use crate::diff::Delta;
use crate::normalize::Position;

/// Heartbeat payload: the full current position list plus the configured
/// interval, rendered even when nothing changed.
pub struct Heartbeat<'a> {
    pub positions: &'a [Position],
    pub interval_hours: f64,
}

/// Render the cycle's outbound message. `None` when there is nothing to
/// report — no events and no heartbeat due.
pub fn render_message(
    trader_url: &str,
    delta: &Delta,
    heartbeat: Option<Heartbeat<'_>>,
) -> Option<String> {
    if delta.is_empty() && heartbeat.is_none() {
        return None;
    }

    let mut sections = vec![format!("🔔 Position monitor\n{trader_url}")];

    if let Some(hb) = heartbeat {
        sections.push(heartbeat_section(&hb));
    }

    if !delta.opened.is_empty() {
        let lines: Vec<String> = delta
            .opened
            .iter()
            .map(|(key, size)| {
                let (symbol, side) = split_key(key);
                format!("• {symbol} {side} — {}", fmt_size(*size))
            })
            .collect();
        sections.push(format!("🟢 Opened:\n{}", lines.join("\n")));
    }

    if !delta.closed.is_empty() {
        let lines: Vec<String> = delta
            .closed
            .iter()
            .map(|(key, size)| {
                let (symbol, side) = split_key(key);
                format!("• {symbol} {side} — was {}", fmt_size(*size))
            })
            .collect();
        sections.push(format!("🔴 Closed:\n{}", lines.join("\n")));
    }

    if !delta.resized.is_empty() {
        let lines: Vec<String> = delta
            .resized
            .iter()
            .map(|(key, old, new)| resized_line(key, *old, *new))
            .collect();
        sections.push(format!("🟡 Resized:\n{}", lines.join("\n")));
    }

    Some(sections.join("\n\n"))
}

fn heartbeat_section(hb: &Heartbeat<'_>) -> String {
    let lines = if hb.positions.is_empty() {
        "—".to_string()
    } else {
        hb.positions
            .iter()
            .map(|p| format!("• {} {} — {}", p.symbol, p.side, fmt_size(p.size)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "⏰ Scheduled report (every {}h)\nCurrent positions ({}):\n{lines}",
        fmt_size(hb.interval_hours),
        hb.positions.len(),
    )
}

fn resized_line(key: &str, old: f64, new: f64) -> String {
    let (symbol, side) = split_key(key);
    let change = new - old;
    let sign = if change > 0.0 { "+" } else { "" };
    if old == 0.0 {
        return format!(
            "• {symbol} {side}: {} → {} ({sign}{})",
            fmt_size(old),
            fmt_size(new),
            fmt_size(change),
        );
    }
    let pct = change / old.abs() * 100.0;
    format!(
        "• {symbol} {side}: {} → {} ({sign}{}; {sign}{pct:.2}%)",
        fmt_size(old),
        fmt_size(new),
        fmt_size(change),
    )
}

/// Split a `symbol:side` key back into its parts.
fn split_key(key: &str) -> (&str, &str) {
    key.split_once(':').unwrap_or((key, ""))
}

/// Compact size formatting: four decimals above one, six below, trailing
/// zeros trimmed.
fn fmt_size(value: f64) -> String {
    let digits = if value.abs() >= 1.0 { 4 } else { 6 };
    let mut s = format!("{value:.digits$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://hyperdash.info/trader/0xabc";

    fn sample_delta() -> Delta {
        Delta {
            opened: vec![("AVAX:short".to_string(), 20.0)],
            closed: vec![("ETH:short".to_string(), 2.0)],
            resized: vec![("SOL:long".to_string(), 100.0, 150.0)],
        }
    }

    #[test]
    fn empty_delta_renders_nothing() {
        assert!(render_message(URL, &Delta::default(), None).is_none());
    }

    #[test]
    fn all_sections_present() {
        let msg = render_message(URL, &sample_delta(), None).expect("message");
        assert!(msg.starts_with("🔔 Position monitor\nhttps://"));
        assert!(msg.contains("🟢 Opened:\n• AVAX short — 20"));
        assert!(msg.contains("🔴 Closed:\n• ETH short — was 2"));
        assert!(msg.contains("🟡 Resized:\n• SOL long: 100 → 150"));
    }

    #[test]
    fn resized_line_carries_change_and_percent() {
        let line = resized_line("SOL:long", 100.0, 150.0);
        assert_eq!(line, "• SOL long: 100 → 150 (+50; +50.00%)");

        let line = resized_line("BTC:short", 4.0, 3.0);
        assert_eq!(line, "• BTC short: 4 → 3 (-1; -25.00%)");
    }

    #[test]
    fn heartbeat_renders_without_changes() {
        let positions = vec![Position {
            symbol: "BTC".to_string(),
            side: "long".to_string(),
            size: 0.25,
        }];
        let msg = render_message(
            URL,
            &Delta::default(),
            Some(Heartbeat {
                positions: &positions,
                interval_hours: 4.0,
            }),
        )
        .expect("message");
        assert!(msg.contains("⏰ Scheduled report (every 4h)"));
        assert!(msg.contains("Current positions (1):\n• BTC long — 0.25"));
    }

    #[test]
    fn heartbeat_with_no_positions_shows_dash() {
        let msg = render_message(
            URL,
            &Delta::default(),
            Some(Heartbeat {
                positions: &[],
                interval_hours: 4.0,
            }),
        )
        .expect("message");
        assert!(msg.contains("Current positions (0):\n—"));
    }

    #[test]
    fn fmt_size_trims_trailing_zeros() {
        assert_eq!(fmt_size(150.0), "150");
        assert_eq!(fmt_size(5.5), "5.5");
        assert_eq!(fmt_size(0.000123), "0.000123");
        assert_eq!(fmt_size(-20.0), "-20");
        assert_eq!(fmt_size(1.23456789), "1.2346");
    }
}
