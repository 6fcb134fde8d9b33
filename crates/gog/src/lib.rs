//! GOG store API client.
//!
//! Resolves a search term (or pinned product id) to a product on
//! [gog.com](https://www.gog.com), normalizes the product payload into
//! the stored `game.json` schema, and downloads screenshot and video
//! thumbnail assets into the game's metadata folder.

mod assets;
mod client;
mod resolve;
mod types;

pub use assets::{SCREENSHOT_LIMIT, VIDEO_THUMB_LIMIT};
pub use client::Client;
pub use resolve::{fetch_and_save, normalize_product, resolve_and_save};
pub use types::{ApiProduct, ApiScreenshot, ApiVideo, FormattedImage, SearchHit};

/// Errors from GOG API operations.
#[derive(Debug, thiserror::Error)]
pub enum GogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] gogshelf_store::StoreError),

    #[error("still rate limited after retries for product {0}")]
    RateLimited(i64),
}
