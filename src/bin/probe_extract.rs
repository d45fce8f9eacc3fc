//! Probe: extraction pipeline against a live trader page
//!
//! Fetches the profile page and documents:
//! - Whether the embedded state blob can be located
//! - Candidate record lists and their sampled key sets
//! - Normalized positions and the resulting snapshot index
//!
//! The upstream page shape is undocumented and drifts; this is the tool for
//! re-deriving matcher rules when extraction starts missing.

use anyhow::Result;

use hyperdash_monitor::DEFAULT_TRADER_URL;
use hyperdash_monitor::api;
use hyperdash_monitor::diff::build_index;
use hyperdash_monitor::extract::{
    default_matchers, discover_candidates, extract_positions, sample_keys,
};
use hyperdash_monitor::page::locate_embedded_state;

#[tokio::main]
async fn main() -> Result<()> {
    let url = std::env::var("TRADER_URL").unwrap_or_else(|_| DEFAULT_TRADER_URL.to_string());

    println!("=== Probe: position extraction ===");
    println!("Trader page: {url}");
    println!();

    println!("--- 1. Fetch page ---");
    let client = api::build_client(30)?;
    let html = api::fetch_profile_page(&client, &url).await?;
    println!("Fetched {} bytes", html.len());
    println!();

    println!("--- 2. Locate embedded state ---");
    let Some(doc) = locate_embedded_state(&html) else {
        println!("No state blob found — page format may have changed");
        return Ok(());
    };
    let top_level = doc.as_object().map(|o| o.len()).unwrap_or(0);
    println!("State blob parsed ({top_level} top-level keys)");
    println!();

    println!("--- 3. Discover candidates ---");
    let matchers = default_matchers();
    let candidates = discover_candidates(&doc, &matchers);
    println!("Candidate lists: {}", candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "  [{i}] {} record(s), sampled keys: {:?}",
            candidate.len(),
            sample_keys(candidate)
        );
    }
    println!();

    println!("--- 4. Normalize ---");
    let positions = extract_positions(&doc);
    println!("Accepted positions: {}", positions.len());
    if !positions.is_empty() {
        println!("{:<12} {:<8} {:>16}", "Symbol", "Side", "Size");
        for p in &positions {
            println!("{:<12} {:<8} {:>16}", p.symbol, p.side, p.size);
        }
    }
    println!();

    println!("--- 5. Snapshot index ---");
    for (key, size) in build_index(&positions) {
        println!("  {key} = {size}");
    }
    println!();

    println!("=== Probe complete ===");
    Ok(())
}
