//! Server-rendered HTML: the page shell and the fragments the UI swaps
//! in. All dynamic text goes through [`escape_html`].

use gogshelf_store::Game;

/// Descriptions longer than this are cut off in the detail view.
pub const DESCRIPTION_LIMIT: usize = 500;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Cuts a description at [`DESCRIPTION_LIMIT`] characters, appending an
/// ellipsis when anything was dropped.
pub fn truncate_description(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Case-insensitive match against the game's title (or id) or its
/// installer path. A blank query matches everything.
pub fn matches_search(game: &Game, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    let title = game.gog_title.as_deref().unwrap_or(&game.display_name);
    title.to_lowercase().contains(&q)
        || game.id.to_lowercase().contains(&q)
        || game.installer_path.to_lowercase().contains(&q)
}

/// Picks a displayable thumbnail URL.
///
/// Protocol-relative URLs get `https:`, absolute URLs pass through,
/// anything else falls back to the first downloaded screenshot.
pub fn resolve_thumbnail(game: &Game) -> Option<String> {
    if let Some(thumb) = &game.thumbnail {
        if let Some(rest) = thumb.strip_prefix("//") {
            return Some(format!("https://{rest}"));
        }
        if thumb.starts_with("http") {
            return Some(thumb.clone());
        }
    }
    game.screenshots_local
        .first()
        .map(|rel| format!("/api/metadata/{}/{rel}", game.id))
}

/// The card grid fragment for `/ui/games`.
pub fn render_game_cards(games: &[Game]) -> String {
    if games.is_empty() {
        return r#"<p class="empty">No games found. Run a scan to discover installers.</p>"#
            .to_string();
    }

    let mut html = String::from(r#"<div class="grid">"#);
    for game in games {
        let title = game.gog_title.as_deref().unwrap_or(&game.display_name);
        let thumb = match resolve_thumbnail(game) {
            Some(url) => format!(
                r#"<img class="thumb" src="{}" alt="" loading="lazy">"#,
                escape_html(&url)
            ),
            None => r#"<div class="thumb thumb-missing"></div>"#.to_string(),
        };
        html.push_str(&format!(
            r#"<div class="card" data-game-id="{id}">{thumb}<div class="card-title">{title}</div></div>"#,
            id = escape_html(&game.id),
            title = escape_html(title),
        ));
    }
    html.push_str("</div>");
    html
}

/// The detail panel fragment for `/ui/games/{id}`.
pub fn render_game_detail(game: &Game) -> String {
    let title = game.gog_title.as_deref().unwrap_or(&game.display_name);
    let mut html = format!(
        r#"<article class="detail" data-game-id="{id}"><h2>{title}</h2>"#,
        id = escape_html(&game.id),
        title = escape_html(title),
    );

    html.push_str(r#"<dl class="meta">"#);
    push_meta(&mut html, "Installer", &game.installer_path);
    push_meta(&mut html, "Type", &game.path_type);
    if let Some(internal) = &game.internal_path {
        push_meta(&mut html, "Inside archive", internal);
    }
    if let Some(date) = &game.release_date {
        push_meta(&mut html, "Released", date);
    }
    html.push_str("</dl>");

    if let Some(link) = &game.gog_link {
        html.push_str(&format!(
            r#"<p><a class="gog-link" href="{}" target="_blank" rel="noopener">View on GOG</a></p>"#,
            escape_html(link)
        ));
    }

    if !game.description.is_empty() {
        html.push_str(&format!(
            r#"<p class="description">{}</p>"#,
            escape_html(&truncate_description(&game.description))
        ));
    }

    if !game.screenshots_local.is_empty() {
        html.push_str(r#"<div class="screenshots">"#);
        for rel in &game.screenshots_local {
            html.push_str(&format!(
                r#"<img src="/api/metadata/{id}/{rel}" alt="" loading="lazy">"#,
                id = escape_html(&game.id),
                rel = escape_html(rel),
            ));
        }
        html.push_str("</div>");
    }

    let search_value = game
        .gog_search_name_override
        .as_deref()
        .unwrap_or("");
    html.push_str(&format!(
        r#"<div class="actions">
<input id="override-name" placeholder="GOG search name" value="{value}">
<button id="save-override">Save override</button>
<button id="refresh-game">Refresh metadata</button>
</div></article>"#,
        value = escape_html(search_value),
    ));
    html
}

fn push_meta(html: &mut String, label: &str, value: &str) {
    html.push_str(&format!(
        "<dt>{}</dt><dd>{}</dd>",
        escape_html(label),
        escape_html(value)
    ));
}

/// The static page shell served at `/`.
pub fn render_index() -> String {
    concat!(
        "<!doctype html>\n",
        "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>gogshelf</title>\n",
        "<link rel=\"stylesheet\" href=\"/static/style.css\">\n",
        "</head>\n<body>\n",
        "<header>\n<h1>gogshelf</h1>\n",
        "<input id=\"search\" type=\"search\" placeholder=\"Search title or path\">\n",
        "<button id=\"scan\">Scan now</button>\n",
        "<span id=\"status\"></span>\n</header>\n",
        "<main>\n<section id=\"games\"><p class=\"empty\">Loading\u{2026}</p></section>\n",
        "<section id=\"detail\"></section>\n</main>\n",
        "<script src=\"/static/app.js\"></script>\n",
        "</body>\n</html>\n",
    )
    .to_string()
}
