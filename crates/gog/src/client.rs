//! HTTP client for the GOG embed search and products endpoints.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use tracing::warn;

use crate::types::{ApiProduct, EmbedSearchResponse, SearchHit};
use crate::GogError;

const DEFAULT_EMBED_BASE: &str = "https://embed.gog.com";
const DEFAULT_API_BASE: &str = "https://api.gog.com";

/// Sent on every request; GOG throttles anonymous default agents hard.
pub const USER_AGENT: &str = "gogshelf/0.1 (+https://github.com/gogshelf/gogshelf)";

/// Fallback backoff when a 429 carries no usable Retry-After.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// GOG API client.
pub struct Client {
    http: reqwest::Client,
    embed_base: String,
    api_base: String,
}

impl Client {
    /// Creates a new client.
    pub fn new() -> Result<Self, GogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            embed_base: DEFAULT_EMBED_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Points both endpoints at custom base URLs (for testing).
    #[cfg(test)]
    pub(crate) fn with_bases(mut self, embed: String, api: String) -> Self {
        self.embed_base = embed;
        self.api_base = api;
        self
    }

    /// Searches GOG by name and returns the first hit, or `None` when the
    /// query is blank or nothing matches.
    pub async fn search(&self, query: &str) -> Result<Option<SearchHit>, GogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/games/ajax/filtered", self.embed_base);
        let resp = self
            .http
            .get(&url)
            .query(&[("mediaType", "game"), ("search", query), ("limit", "5")])
            .header(reqwest::header::REFERER, "https://www.gog.com/")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbedSearchResponse = resp.json().await?;
        Ok(parsed.products.into_iter().find_map(|p| {
            p.id.map(|id| SearchHit {
                id,
                slug: p.slug,
                title: p.title,
            })
        }))
    }

    /// Fetches product details with screenshots, videos and description
    /// expanded. Honors 429 Retry-After with a bounded number of retries.
    pub async fn product(&self, product_id: i64) -> Result<ApiProduct, GogError> {
        let url = format!("{}/products/{product_id}", self.api_base);

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("locale", "en_US"),
                    ("expand", "screenshots,videos,description"),
                ])
                .send()
                .await?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after(resp.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
                warn!(product_id, attempt, wait_secs = wait.as_secs(), "rate limited by GOG");
                tokio::time::sleep(wait).await;
                continue;
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(GogError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(resp.json().await?);
        }

        Err(GogError::RateLimited(product_id))
    }

    /// Downloads a single asset to `dest`, creating parent directories.
    ///
    /// Protocol-relative URLs get an `https:` prefix first.
    pub async fn download_asset(&self, url: &str, dest: &Path) -> Result<(), GogError> {
        let url = gogshelf_store::ensure_https(url);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GogError::Api {
                status: status.as_u16(),
                body: format!("asset download failed: {url}"),
            });
        }

        let bytes = resp.bytes().await?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

/// Parses a Retry-After header given in seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}
