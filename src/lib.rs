pub mod api;
pub mod config;
pub mod diff;
pub mod extract;
pub mod normalize;
pub mod notify;
pub mod page;
pub mod report;
pub mod state;

/// Default trader profile — the account this monitor was originally pointed at.
pub const DEFAULT_TRADER_URL: &str =
    "https://hyperdash.info/trader/0xc2a30212a8DdAc9e123944d6e29FADdCe994E5f2";

/// Telegram Bot API base URL (bot token is appended per request).
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
