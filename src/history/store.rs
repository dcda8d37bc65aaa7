use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::shared::constants;
use crate::utils::logger;

/// On-disk shape: one fixed `colorHistory` key holding the ordered list.
#[derive(Serialize, Deserialize, Default)]
struct HistoryFile {
    #[serde(rename = "colorHistory", default)]
    color_history: Vec<String>,
}

/// Recently captured hex colors, most recent first, no duplicates.
///
/// Constructed once at startup by whoever owns the UI and passed down from
/// there; the watch loop and the history screen share one instance behind a
/// mutex. Every mutation persists the whole list; a failed write is logged
/// and the in-memory state stays authoritative for the session.
pub struct ColorHistory {
    entries: Vec<String>,
    path: PathBuf,
}

impl ColorHistory {
    /// Load from the user data directory.
    pub fn load_default() -> Self {
        Self::load(default_history_path())
    }

    /// Load from `path`. A missing file is a first launch, not an error;
    /// an unreadable or malformed one is logged and treated the same.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HistoryFile>(&content) {
                Ok(file) => file.color_history,
                Err(e) => {
                    logger::error(&format!(
                        "Malformed history file {:?}, starting empty: {}",
                        path, e
                    ));
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        logger::debug(&format!(
            "Loaded {} history entries from {:?}",
            entries.len(),
            path
        ));

        Self { entries, path }
    }

    /// Insert `hex` at the front, moving it there if already present.
    pub fn save(&mut self, hex: &str) {
        self.entries.retain(|entry| entry != hex);
        self.entries.insert(0, hex.to_string());
        self.persist();
    }

    /// Most recent first.
    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.write_to_disk() {
            logger::error(&format!("Failed to persist color history: {}", e));
        }
    }

    fn write_to_disk(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }

        let file = HistoryFile {
            color_history: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        fs::write(&self.path, json).with_context(|| format!("failed to write {:?}", self.path))
    }
}

pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::APP_NAME)
        .join(constants::HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("hexcam_store_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let history = ColorHistory::load(scratch_path("missing.json"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_save_deduplicates_at_front() {
        let mut history = ColorHistory::load(scratch_path("dedup.json"));
        history.save("#FA0A0A");
        history.save("#FA0A0A");

        assert_eq!(history.list(), ["#FA0A0A"]);
    }

    #[test]
    fn test_distinct_saves_order_most_recent_first() {
        let mut history = ColorHistory::load(scratch_path("order.json"));
        history.save("#111111");
        history.save("#222222");
        history.save("#333333");

        assert_eq!(history.list(), ["#333333", "#222222", "#111111"]);
    }

    #[test]
    fn test_resave_moves_to_front() {
        let mut history = ColorHistory::load(scratch_path("movefront.json"));
        history.save("#FA0A0A");
        history.save("#112233");
        history.save("#FA0A0A");

        assert_eq!(history.list(), ["#FA0A0A", "#112233"]);
    }

    #[test]
    fn test_round_trip_through_fresh_load() {
        let path = scratch_path("roundtrip.json");

        let mut history = ColorHistory::load(path.clone());
        history.save("#010203");
        history.save("#040506");
        let before: Vec<String> = history.list().to_vec();
        drop(history);

        let reloaded = ColorHistory::load(path);
        assert_eq!(reloaded.list(), before.as_slice());
        assert_eq!(reloaded.list(), ["#040506", "#010203"]);
    }

    #[test]
    fn test_persisted_shape_uses_fixed_key() {
        let path = scratch_path("shape.json");

        let mut history = ColorHistory::load(path.clone());
        history.save("#ABCDEF");

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[constants::HISTORY_KEY][0], "#ABCDEF");
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let path = scratch_path("malformed.json");
        fs::write(&path, "not json at all").unwrap();

        let history = ColorHistory::load(path);
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let path = scratch_path("clear.json");

        let mut history = ColorHistory::load(path.clone());
        history.save("#111111");
        history.clear();
        assert!(history.is_empty());

        let reloaded = ColorHistory::load(path);
        assert!(reloaded.is_empty());
    }
}
