//! Locating the embedded client-state payload in profile-page markup.
//!
//! Hyperdash renders trader profiles with Next.js; the server-rendered state
//! ships as a JSON document inside a `<script id="__NEXT_DATA__">` element.
//! The markup is scanned directly so attribute order, quoting style, and tag
//! case don't matter.

use serde_json::Value;

/// Identifying id attribute of the Next.js state script element.
pub const NEXT_DATA_SCRIPT_ID: &str = "__NEXT_DATA__";

/// Recover the embedded state document from raw page markup.
///
/// Tries the id-tagged script element first, then falls back to scanning all
/// script bodies for the `__NEXT_DATA__` marker and taking the largest
/// brace-delimited slice. `None` when no strategy yields valid JSON — a soft
/// miss, the cycle treats it as "no positions available".
pub fn locate_embedded_state(html: &str) -> Option<Value> {
    let blocks = script_blocks(html);

    for (attrs, body) in &blocks {
        if has_next_data_id(attrs) && !body.trim().is_empty() {
            if let Ok(doc) = serde_json::from_str(body.trim()) {
                return Some(doc);
            }
        }
    }

    for (_, body) in &blocks {
        if body.contains(NEXT_DATA_SCRIPT_ID) {
            if let Some(slice) = brace_slice(body) {
                return serde_json::from_str(slice).ok();
            }
        }
    }

    None
}

/// Split markup into `(attributes, body)` pairs, one per script element.
/// Case-insensitive tag scan; unterminated elements are dropped.
fn script_blocks(html: &str) -> Vec<(&str, &str)> {
    let lower = html.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some(offset) = lower[pos..].find("<script") {
        let tag_start = pos + offset;
        let Some(open_len) = lower[tag_start..].find('>') else {
            break;
        };
        let attrs = &html[tag_start + "<script".len()..tag_start + open_len];
        let body_start = tag_start + open_len + 1;
        let Some(body_len) = lower[body_start..].find("</script") else {
            break;
        };
        blocks.push((attrs, &html[body_start..body_start + body_len]));
        pos = body_start + body_len + "</script".len();
    }
    blocks
}

fn has_next_data_id(attrs: &str) -> bool {
    attrs.contains(&format!("id=\"{NEXT_DATA_SCRIPT_ID}\""))
        || attrs.contains(&format!("id='{NEXT_DATA_SCRIPT_ID}'"))
}

/// Largest brace-delimited slice: first `{` through last `}`.
fn brace_slice(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}
