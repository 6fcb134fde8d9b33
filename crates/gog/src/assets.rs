//! Screenshot and video thumbnail download.

use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::client::Client;
use crate::types::{ApiScreenshot, ApiVideo};

/// At most this many screenshots are downloaded per game.
pub const SCREENSHOT_LIMIT: usize = 10;
/// At most this many video thumbnails are downloaded per game.
pub const VIDEO_THUMB_LIMIT: usize = 3;

/// Pacing between asset downloads to stay under GOG's rate limit.
const ASSET_DELAY: Duration = Duration::from_millis(200);

/// The formatter GOG uses for gallery-sized screenshots.
const PREFERRED_FORMATTER: &str = "ggvgm";

/// Picks one download URL per screenshot, preferring the `ggvgm`
/// formatted variant, else the first formatted image.
pub(crate) fn screenshot_urls(screenshots: &[ApiScreenshot], limit: usize) -> Vec<String> {
    screenshots
        .iter()
        .take(limit)
        .filter_map(|s| {
            s.formatted_images
                .iter()
                .find(|f| f.formatter_name == PREFERRED_FORMATTER && !f.image_url.is_empty())
                .or_else(|| s.formatted_images.first().filter(|f| !f.image_url.is_empty()))
                .map(|f| gogshelf_store::ensure_https(&f.image_url))
        })
        .collect()
}

/// Keeps `[A-Za-z0-9._-]`, replaces the rest, caps at 200 chars.
pub(crate) fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(200)
        .collect();
    if cleaned.is_empty() { "file".into() } else { cleaned }
}

/// `.jpg` when the URL path mentions jpg, `.png` otherwise.
pub(crate) fn ext_for_url(url: &str) -> &'static str {
    let path = url.split('?').next().unwrap_or(url);
    if path.contains(".jpg") { ".jpg" } else { ".png" }
}

/// Downloads screenshots into `<game_dir>/screenshots/` and returns the
/// relative paths of the ones that succeeded.
pub async fn download_screenshots(
    client: &Client,
    screenshots: &[ApiScreenshot],
    game_dir: &Path,
) -> Vec<String> {
    let urls = screenshot_urls(screenshots, SCREENSHOT_LIMIT);
    let mut rel_paths = Vec::new();

    for (i, url) in urls.iter().enumerate() {
        let name = format!("{i:02}{}", ext_for_url(url));
        let dest = game_dir.join("screenshots").join(&name);
        match client.download_asset(url, &dest).await {
            Ok(()) => rel_paths.push(format!("screenshots/{name}")),
            Err(e) => warn!(url, "screenshot download failed: {e}"),
        }
        tokio::time::sleep(ASSET_DELAY).await;
    }

    rel_paths
}

/// Downloads video thumbnails into `<game_dir>/videos/` and returns the
/// relative paths of the ones that succeeded.
pub async fn download_video_thumbs(
    client: &Client,
    videos: &[ApiVideo],
    game_dir: &Path,
) -> Vec<String> {
    let mut rel_paths = Vec::new();

    for (i, video) in videos.iter().take(VIDEO_THUMB_LIMIT).enumerate() {
        let Some(url) = video.thumb_url() else {
            continue;
        };
        let ident = video.ident();
        let base = if ident.is_empty() {
            format!("thumb_{i}")
        } else {
            safe_filename(&ident)
        };
        let name = format!("{base}{}", ext_for_url(&url));
        let dest = game_dir.join("videos").join(&name);
        match client.download_asset(&url, &dest).await {
            Ok(()) => rel_paths.push(format!("videos/{name}")),
            Err(e) => warn!(url, "video thumbnail download failed: {e}"),
        }
        tokio::time::sleep(ASSET_DELAY).await;
    }

    rel_paths
}
