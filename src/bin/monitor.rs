use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use hyperdash_monitor::api;
use hyperdash_monitor::config::{AppConfig, CONFIG_PATH, EnvConfig};
use hyperdash_monitor::diff::{build_index, diff_indices};
use hyperdash_monitor::extract::extract_positions;
use hyperdash_monitor::notify::Notifier;
use hyperdash_monitor::page::locate_embedded_state;
use hyperdash_monitor::report::{Heartbeat, render_message};
use hyperdash_monitor::state::{self, MonitorState};

#[derive(Parser)]
#[command(name = "monitor", about = "Hyperdash trader position monitor")]
struct Args {
    /// Print the report to stdout; nothing is sent or persisted
    #[arg(long)]
    dry_run: bool,

    /// Report an empty extraction as a real all-closed snapshot
    #[arg(long)]
    accept_empty: bool,

    /// Config file path
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    let env = EnvConfig::from_env()?;

    let client = api::build_client(config.settings.request_timeout_secs)?;
    let notifier = Notifier::new(client.clone(), env.telegram.clone(), env.discord.clone());

    if let Err(e) = run_cycle(&args, &config, &env, &client, &notifier).await {
        warn!("Cycle failed: {e:#}");
        if !args.dry_run {
            notifier.broadcast(&format!("⚠️ Monitor error: {e:#}")).await;
        }
        return Err(e);
    }
    Ok(())
}

/// One fetch-diff-notify cycle.
async fn run_cycle(
    args: &Args,
    config: &AppConfig,
    env: &EnvConfig,
    client: &reqwest::Client,
    notifier: &Notifier,
) -> Result<()> {
    let settings = &config.settings;

    info!("Fetching trader profile: {}", env.trader_url);
    let html = api::fetch_profile_page(client, &env.trader_url).await?;

    let positions = match locate_embedded_state(&html) {
        Some(doc) => extract_positions(&doc),
        None => {
            warn!("No embedded state blob found in page");
            Vec::new()
        }
    };
    info!("Extracted {} position(s)", positions.len());

    let state_path = Path::new(&settings.state_path);
    let prev_state = state::load(state_path);
    if prev_state.fetched_at == 0 {
        info!("No previous snapshot — treating as first run");
    }

    // A transient scrape failure looks identical to a full liquidation;
    // refuse to report one as the other unless told to.
    if positions.is_empty() && !prev_state.index.is_empty() && !args.accept_empty {
        warn!(
            "Extraction came back empty while {} position(s) were previously open; \
             skipping diff and keeping state (pass --accept-empty to override)",
            prev_state.index.len()
        );
        return Ok(());
    }

    let current = build_index(&positions);
    let delta = diff_indices(&prev_state.index, &current, settings.size_tolerance);

    let now = chrono::Utc::now().timestamp();
    let heartbeat_due = settings.heartbeat_hours > 0.0
        && prev_state
            .last_heartbeat
            .is_none_or(|t| now - t >= (settings.heartbeat_hours * 3600.0) as i64);
    let heartbeat = heartbeat_due.then(|| Heartbeat {
        positions: &positions,
        interval_hours: settings.heartbeat_hours,
    });

    let Some(message) = render_message(&env.trader_url, &delta, heartbeat) else {
        info!("No changes.");
        return Ok(());
    };

    info!(
        "Reporting {} opened / {} closed / {} resized",
        delta.opened.len(),
        delta.closed.len(),
        delta.resized.len(),
    );

    if args.dry_run {
        println!("{message}");
        info!("Dry run — state left untouched");
        return Ok(());
    }

    if notifier.has_channels() {
        notifier.broadcast(&message).await;
    } else {
        info!("No notification channels configured, message:\n{message}");
    }

    let next_state = MonitorState {
        index: current,
        fetched_at: now,
        last_heartbeat: if heartbeat_due {
            Some(now)
        } else {
            prev_state.last_heartbeat
        },
    };
    state::save(state_path, &next_state)?;
    info!("Snapshot persisted to {}", state_path.display());

    Ok(())
}
