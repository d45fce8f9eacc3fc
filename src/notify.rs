//! Outbound notification channels.
//!
//! Both channels are fire-and-forget: delivery failures are logged and the
//! cycle carries on.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::TELEGRAM_API_BASE;

/// Telegram rejects messages over 4096 characters; chunk well below that.
const TELEGRAM_CHUNK_LEN: usize = 3900;

#[derive(Debug, Clone)]
pub struct TelegramChannel {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct DiscordChannel {
    pub webhook_url: String,
}

/// Fans one message out to every configured channel.
pub struct Notifier {
    client: Client,
    telegram: Option<TelegramChannel>,
    discord: Option<DiscordChannel>,
}

impl Notifier {
    pub fn new(
        client: Client,
        telegram: Option<TelegramChannel>,
        discord: Option<DiscordChannel>,
    ) -> Self {
        Self {
            client,
            telegram,
            discord,
        }
    }

    pub fn has_channels(&self) -> bool {
        self.telegram.is_some() || self.discord.is_some()
    }

    /// Deliver `message` to all configured channels. Failures are warned,
    /// never propagated; a cycle does not die on a notification error.
    pub async fn broadcast(&self, message: &str) {
        if let Some(telegram) = &self.telegram {
            if let Err(e) = self.send_telegram(telegram, message).await {
                warn!("Telegram delivery failed: {e:#}");
            }
        }
        if let Some(discord) = &self.discord {
            if let Err(e) = self.send_discord(discord, message).await {
                warn!("Discord delivery failed: {e:#}");
            }
        }
    }

    async fn send_telegram(&self, channel: &TelegramChannel, message: &str) -> Result<()> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", channel.bot_token);
        for chunk in chunk_message(message, TELEGRAM_CHUNK_LEN) {
            let form = [
                ("chat_id", channel.chat_id.as_str()),
                ("text", chunk),
                ("disable_web_page_preview", "true"),
            ];
            let resp = self
                .client
                .post(&url)
                .form(&form)
                .send()
                .await
                .context("telegram request failed")?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("telegram responded {status}: {body}");
            }
            debug!("Telegram chunk delivered ({} bytes)", chunk.len());
        }
        Ok(())
    }

    async fn send_discord(&self, channel: &DiscordChannel, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(&channel.webhook_url)
            .json(&serde_json::json!({ "content": message }))
            .send()
            .await
            .context("discord request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("discord responded {status}: {body}");
        }
        Ok(())
    }
}

/// Split a message into chunks of at most `max_len` bytes, cutting only on
/// char boundaries.
fn chunk_message(message: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = message;
    while rest.len() > max_len {
        let mut cut = max_len;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}
