//! On-disk snapshot state between runs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::diff::SnapshotIndex;

/// Persisted state document. The `index` and `fetched_at` field names are a
/// compatibility contract with existing state files; `last_heartbeat` is
/// additive and omitted when unset.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MonitorState {
    #[serde(default)]
    pub index: SnapshotIndex,
    /// Epoch seconds of the snapshot's fetch.
    #[serde(default)]
    pub fetched_at: i64,
    /// Epoch seconds of the last scheduled report, if any was ever sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<i64>,
}

/// Load persisted state. A missing, unreadable, or corrupt file means
/// first-run semantics: an empty previous snapshot.
pub fn load(path: &Path) -> MonitorState {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
        Err(_) => MonitorState::default(),
    }
}

/// Write state as pretty JSON, creating parent directories if needed.
pub fn save(path: &Path, state: &MonitorState) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(state).context("failed to serialize state")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
