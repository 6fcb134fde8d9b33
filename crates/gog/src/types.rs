//! Wire types for the GOG embed search and products APIs.

use serde::{Deserialize, Serialize};

/// First search hit from the embed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub slug: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedSearchResponse {
    #[serde(default)]
    pub products: Vec<EmbedProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedProduct {
    pub id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A screenshot descriptor from the products API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiScreenshot {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub formatted_images: Vec<FormattedImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormattedImage {
    #[serde(default)]
    pub formatter_name: String,
    #[serde(default)]
    pub image_url: String,
}

/// A video descriptor from the products API.
///
/// `thumbnail` is either a plain URL string or an object with a `url`
/// field, depending on the product; `id`/`video_id` vary the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiVideo {
    #[serde(default)]
    pub thumbnail: serde_json::Value,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub id: serde_json::Value,
}

impl ApiVideo {
    /// Best-effort thumbnail URL.
    pub fn thumb_url(&self) -> Option<String> {
        let from_value = match &self.thumbnail {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(o) => o
                .get("url")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        };
        from_value
            .or_else(|| self.thumbnail_url.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Identifier used to name the downloaded thumbnail file.
    pub fn ident(&self) -> String {
        if let Some(vid) = &self.video_id {
            if !vid.is_empty() {
                return vid.clone();
            }
        }
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Raw product payload from `api.gog.com/products/{id}`.
///
/// `description` is an object (`lead`/`full`) when fetched with
/// `expand=description`, but a plain string on some older products.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProduct {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: serde_json::Value,
    pub release_date: Option<String>,
    #[serde(default)]
    pub links: gogshelf_store::GameLinks,
    #[serde(default)]
    pub images: gogshelf_store::GameImages,
    #[serde(default)]
    pub screenshots: Vec<ApiScreenshot>,
    #[serde(default)]
    pub videos: Vec<ApiVideo>,
    pub game_type: Option<String>,
}

/// Extracts display text from the polymorphic `description` field.
pub(crate) fn description_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(o) => o
            .get("lead")
            .or_else(|| o.get("full"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}
