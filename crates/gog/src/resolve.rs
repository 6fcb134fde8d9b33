//! Resolving a game to a GOG product and persisting the result.

use std::path::Path;
use std::time::Duration;

use gogshelf_store::{game_dir, save_game_json, GameJson};
use tracing::{debug, info};

use crate::assets::{download_screenshots, download_video_thumbs};
use crate::client::Client;
use crate::types::{description_text, ApiProduct};
use crate::GogError;

/// Pacing after a product fetch, before asset downloads start.
const PRODUCT_DELAY: Duration = Duration::from_millis(800);

/// Normalizes a raw product payload into the stored `game.json` schema.
pub fn normalize_product(raw: &ApiProduct) -> GameJson {
    GameJson {
        id: raw.id,
        title: raw.title.clone(),
        slug: raw.slug.clone(),
        description: description_text(&raw.description),
        release_date: raw.release_date.clone(),
        links: raw.links.clone(),
        images: raw.images.clone(),
        screenshots: raw
            .screenshots
            .iter()
            .filter_map(|s| serde_json::to_value(s).ok())
            .collect(),
        videos: raw
            .videos
            .iter()
            .filter_map(|v| serde_json::to_value(v).ok())
            .collect(),
        screenshots_local: Vec::new(),
        videos_local: Vec::new(),
        game_type: raw.game_type.clone(),
    }
}

/// Fetches a product, normalizes it, optionally downloads assets, and
/// writes `game.json` for `key`.
pub async fn fetch_and_save(
    client: &Client,
    product_id: i64,
    metadata_root: &Path,
    key: &str,
    download_assets: bool,
) -> Result<GameJson, GogError> {
    let raw = client.product(product_id).await?;
    tokio::time::sleep(PRODUCT_DELAY).await;

    let mut game = normalize_product(&raw);

    if download_assets {
        let dir = game_dir(metadata_root, key);
        game.screenshots_local = download_screenshots(client, &raw.screenshots, &dir).await;
        game.videos_local = download_video_thumbs(client, &raw.videos, &dir).await;
        debug!(
            key,
            screenshots = game.screenshots_local.len(),
            videos = game.videos_local.len(),
            "assets downloaded"
        );
    }

    save_game_json(metadata_root, key, &game)?;
    info!(key, product_id, title = game.title.as_deref().unwrap_or(""), "metadata saved");
    Ok(game)
}

/// Resolves a game by pinned product id or search name, then fetches and
/// saves its metadata. `Ok(None)` means the search found nothing.
pub async fn resolve_and_save(
    client: &Client,
    search_name: &str,
    metadata_root: &Path,
    key: &str,
    product_id_override: Option<i64>,
    download_assets: bool,
) -> Result<Option<GameJson>, GogError> {
    if let Some(product_id) = product_id_override {
        let game =
            fetch_and_save(client, product_id, metadata_root, key, download_assets).await?;
        return Ok(Some(game));
    }

    let Some(hit) = client.search(search_name).await? else {
        return Ok(None);
    };
    let game = fetch_and_save(client, hit.id, metadata_root, key, download_assets).await?;
    Ok(Some(game))
}
