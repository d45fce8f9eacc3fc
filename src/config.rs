use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::diff::DEFAULT_SIZE_TOLERANCE;
use crate::notify::{DiscordChannel, TelegramChannel};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`. The file is
/// optional; defaults cover every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Where the previous snapshot index is persisted between runs.
    #[serde(default = "default_state_path")]
    pub state_path: String,
    /// Page fetch timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Size changes at or below this are treated as unchanged.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,
    /// Interval for full-position summary reports; 0 disables them.
    #[serde(default)]
    pub heartbeat_hours: f64,
}

fn default_state_path() -> String {
    "last_positions.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_size_tolerance() -> f64 {
    DEFAULT_SIZE_TOLERANCE
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            request_timeout_secs: default_request_timeout_secs(),
            size_tolerance: default_size_tolerance(),
            heartbeat_hours: 0.0,
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path; defaults when the file is
    /// absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Environment-sourced target and notification credentials.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub trader_url: String,
    pub telegram: Option<TelegramChannel>,
    pub discord: Option<DiscordChannel>,
}

impl EnvConfig {
    /// Read `TRADER_URL` (required) and the optional channel credentials
    /// from the environment.
    pub fn from_env() -> Result<Self> {
        let trader_url = std::env::var("TRADER_URL").context("TRADER_URL is not set")?;
        let telegram = match (env_opt("TELEGRAM_BOT_TOKEN"), env_opt("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramChannel { bot_token, chat_id }),
            _ => None,
        };
        let discord = env_opt("DISCORD_WEBHOOK_URL").map(|webhook_url| DiscordChannel { webhook_url });
        Ok(Self {
            trader_url,
            telegram,
            discord,
        })
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
