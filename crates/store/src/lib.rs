//! Metadata store for scanned games.
//!
//! Each game owns a folder under the metadata root, named after its
//! sanitized scan key. The folder holds `game.json` (normalized GOG
//! product data plus downloaded asset paths) and `override.json`
//! (user-set search name / product id and the last-known installer
//! facts). `_scan_state.json` at the root records the keys seen by the
//! previous scan.

mod files;
mod merge;
mod types;

pub use files::{
    game_dir, list_game_keys, load_game_json, load_override, load_scan_state, product_id_override,
    save_game_json, save_override, save_scan_state, search_name,
};
pub use merge::{ensure_https, game_by_key, merge_game_with_installer};
pub use types::{Game, GameImages, GameJson, GameLinks, OverrideData, ScanState};

/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
