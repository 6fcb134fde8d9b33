//! On-disk and API-facing data types.

use serde::{Deserialize, Serialize};

/// Store links from the GOG product payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameLinks {
    pub product_card: Option<String>,
    pub support: Option<String>,
    pub forum: Option<String>,
}

/// Image URLs from the GOG product payload (often protocol-relative).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameImages {
    pub background: Option<String>,
    pub logo: Option<String>,
    pub icon: Option<String>,
}

/// Normalized GOG product data, persisted as `game.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameJson {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub links: GameLinks,
    #[serde(default)]
    pub images: GameImages,
    /// Raw screenshot descriptors as returned by the API.
    #[serde(default)]
    pub screenshots: Vec<serde_json::Value>,
    /// Raw video descriptors as returned by the API.
    #[serde(default)]
    pub videos: Vec<serde_json::Value>,
    /// Paths of downloaded screenshots, relative to the game folder.
    #[serde(default)]
    pub screenshots_local: Vec<String>,
    /// Paths of downloaded video thumbnails, relative to the game folder.
    #[serde(default)]
    pub videos_local: Vec<String>,
    pub game_type: Option<String>,
}

/// User-set overrides plus last-known installer facts, persisted as
/// `override.json`.
///
/// The installer facts let the detail endpoint answer without a rescan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideData {
    /// Replacement GOG search term, consumed on the next refresh.
    pub gog_search_name: Option<String>,
    /// Fixed GOG product id; skips the search entirely.
    pub product_id: Option<i64>,
    pub installer_path: Option<String>,
    pub path_type: Option<String>,
    pub internal_path: Option<String>,
    pub display_name: Option<String>,
}

/// Keys seen by the previous scan, persisted as `_scan_state.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanState {
    #[serde(default)]
    pub installer_keys: Vec<String>,
    /// Unix seconds of the last completed scan.
    pub last_scan: Option<i64>,
}

/// API-facing game model: installer facts merged with stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub key: String,
    pub path_type: String,
    pub installer_path: String,
    pub internal_path: Option<String>,
    pub display_name: String,
    pub gog_title: Option<String>,
    pub gog_slug: Option<String>,
    pub gog_link: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub screenshots_local: Vec<String>,
    #[serde(default)]
    pub videos_local: Vec<String>,
    pub gog_search_name_override: Option<String>,
    #[serde(default)]
    pub description: String,
    pub release_date: Option<String>,
}
