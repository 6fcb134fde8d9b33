//! Route table and request handlers.

use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use gogshelf_scan::ScanSummary;
use gogshelf_scanner::scan_installers;
use gogshelf_store::{
    game_by_key, game_dir, load_override, merge_game_with_installer, product_id_override,
    save_override, search_name, Game,
};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::view;

const APP_JS: &str = include_str!("../static/app.js");
const STYLE_CSS: &str = include_str!("../static/style.css");

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
        .route("/static/style.css", get(style_css))
        .route("/ui/games", get(ui_games))
        .route("/ui/games/:game_id", get(ui_game_detail))
        .route("/api/games", get(list_games))
        .route("/api/games/:game_id", get(get_game))
        .route("/api/games/:game_id/override", put(put_override))
        .route("/api/games/:game_id/refresh", post(refresh_game))
        .route("/api/scan", post(trigger_scan))
        .route("/api/metadata/:game_id/*path", get(metadata_asset))
        .with_state(state)
}

// ---------------------------------------------------------------- shell

async fn index() -> Html<String> {
    Html(view::render_index())
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

// ------------------------------------------------------------------ api

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

/// Walks the installer root and merges every current installer with its
/// stored metadata. The list always reflects what is on disk right now.
async fn load_games(state: &AppState, query: &SearchQuery) -> Result<Vec<Game>, ApiError> {
    let entries = scan_installers(&state.installer_root)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let filter = query.search.as_deref().unwrap_or("");
    Ok(entries
        .iter()
        .map(|entry| merge_game_with_installer(&state.metadata_root, entry))
        .filter(|game| view::matches_search(game, filter))
        .collect())
}

async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let games = load_games(&state, &query).await?;
    Ok(Json(serde_json::json!({
        "games": games,
        "total": games.len(),
    })))
}

async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<Game>, ApiError> {
    game_by_key(&state.metadata_root, &game_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Game not found".into()))
}

/// Override body. Absent fields are left alone; `null` (or a blank
/// string) clears the stored value.
#[derive(Debug, Default, Deserialize)]
struct OverrideBody {
    #[serde(default, deserialize_with = "double_option")]
    gog_search_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    product_id: Option<Option<i64>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

async fn put_override(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    body: Result<Json<OverrideBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Keep rejections on the `{"detail": ...}` contract instead of
    // axum's plain-text default.
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut ov = load_override(&state.metadata_root, &game_id).unwrap_or_default();
    if let Some(name) = body.gog_search_name {
        ov.gog_search_name = name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }
    if let Some(product_id) = body.product_id {
        ov.product_id = product_id;
    }
    save_override(&state.metadata_root, &game_id, &ov)?;
    info!(key = game_id, "override updated");

    Ok(Json(serde_json::json!({ "ok": true, "override": ov })))
}

async fn refresh_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = search_name(&state.metadata_root, &game_id, "");
    let product_id = product_id_override(&state.metadata_root, &game_id);
    if name.is_empty() && product_id.is_none() {
        return Err(ApiError::BadRequest(
            "Set gog_search_name or product_id override first".into(),
        ));
    }

    let resolved = state
        .resolver
        .resolve(
            &name,
            &state.metadata_root,
            &game_id,
            product_id,
            state.download_assets,
        )
        .await
        .map_err(|e| ApiError::Upstream(format!("GOG lookup failed: {e}")))?
        .ok_or_else(|| ApiError::Upstream("GOG lookup failed".into()))?;

    Ok(Json(serde_json::json!({ "ok": true, "title": resolved.title })))
}

async fn trigger_scan(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScanSummary>, ApiError> {
    let _guard = state.scan_lock.lock().await;
    let summary = gogshelf_scan::run_scan(&state.scan_context()).await?;
    Ok(Json(summary))
}

// ------------------------------------------------------------------- ui

async fn ui_games(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let games = load_games(&state, &query).await?;
    Ok(Html(view::render_game_cards(&games)))
}

async fn ui_game_detail(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    game_by_key(&state.metadata_root, &game_id)
        .map(|game| Html(view::render_game_detail(&game)))
        .ok_or_else(|| ApiError::NotFound("Game not found".into()))
}

// --------------------------------------------------------------- assets

/// Joins a client-supplied relative path onto `dir`, rejecting anything
/// that could escape it.
fn safe_join(dir: &FsPath, rel: &str) -> Option<PathBuf> {
    let rel = FsPath::new(rel);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(dir.join(rel))
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

async fn metadata_asset(
    State(state): State<Arc<AppState>>,
    Path((game_id, rel)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let dir = game_dir(&state.metadata_root, &game_id);
    let file =
        safe_join(&dir, &rel).ok_or_else(|| ApiError::NotFound("Not found".into()))?;

    let bytes = tokio::fs::read(&file)
        .await
        .map_err(|_| ApiError::NotFound("Not found".into()))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&file))], bytes))
}
