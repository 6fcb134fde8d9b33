//! Per-game folder layout and JSON persistence.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{GameJson, OverrideData, ScanState};
use crate::StoreError;

const GAME_JSON: &str = "game.json";
const OVERRIDE_JSON: &str = "override.json";
const SCAN_STATE_FILE: &str = "_scan_state.json";

/// Path to a game's metadata folder (may not exist yet).
///
/// The key is sanitized to `[A-Za-z0-9._-]` so it is always a single
/// safe path component.
pub fn game_dir(metadata_root: &Path, key: &str) -> PathBuf {
    let safe: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    metadata_root.join(safe)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(path = %path.display(), "ignoring corrupt JSON: {e}");
            None
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Loads `game.json` for a game. Missing or corrupt files yield `None`.
pub fn load_game_json(metadata_root: &Path, key: &str) -> Option<GameJson> {
    read_json(&game_dir(metadata_root, key).join(GAME_JSON))
}

/// Writes `game.json`, creating the game folder if needed.
pub fn save_game_json(
    metadata_root: &Path,
    key: &str,
    game: &GameJson,
) -> Result<(), StoreError> {
    write_json(&game_dir(metadata_root, key).join(GAME_JSON), game)
}

/// Loads `override.json`. Missing or corrupt files yield `None`.
pub fn load_override(metadata_root: &Path, key: &str) -> Option<OverrideData> {
    read_json(&game_dir(metadata_root, key).join(OVERRIDE_JSON))
}

/// Writes `override.json`, creating the game folder if needed.
pub fn save_override(
    metadata_root: &Path,
    key: &str,
    data: &OverrideData,
) -> Result<(), StoreError> {
    write_json(&game_dir(metadata_root, key).join(OVERRIDE_JSON), data)
}

/// Search term for GOG lookups: the override if set and non-blank,
/// otherwise `default`.
pub fn search_name(metadata_root: &Path, key: &str, default: &str) -> String {
    if let Some(ov) = load_override(metadata_root, key) {
        if let Some(name) = ov.gog_search_name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    default.to_string()
}

/// Fixed GOG product id for this game, if the user pinned one.
pub fn product_id_override(metadata_root: &Path, key: &str) -> Option<i64> {
    load_override(metadata_root, key)?.product_id
}

/// All game keys with a metadata folder holding `game.json` or
/// `override.json`, sorted. Folders starting with `_` are reserved.
pub fn list_game_keys(metadata_root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(metadata_root) else {
        return Vec::new();
    };

    let mut keys: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| !name.starts_with('_'))
        .filter(|name| {
            let dir = metadata_root.join(name);
            dir.join(GAME_JSON).exists() || dir.join(OVERRIDE_JSON).exists()
        })
        .collect();
    keys.sort();
    keys
}

/// Loads `_scan_state.json`. Missing or corrupt files yield the default
/// (no keys, no timestamp).
pub fn load_scan_state(metadata_root: &Path) -> ScanState {
    read_json(&metadata_root.join(SCAN_STATE_FILE)).unwrap_or_default()
}

/// Persists the current installer keys with a fresh timestamp.
pub fn save_scan_state(metadata_root: &Path, installer_keys: &[String]) -> Result<(), StoreError> {
    let state = ScanState {
        installer_keys: installer_keys.to_vec(),
        last_scan: Some(chrono::Utc::now().timestamp()),
    };
    write_json(&metadata_root.join(SCAN_STATE_FILE), &state)
}
