//! Building the API-facing [`Game`] model from installer facts and
//! stored metadata.

use std::path::Path;

use gogshelf_scanner::{InstallerEntry, InstallerKind};

use crate::files::{load_game_json, load_override};
use crate::types::Game;

const GOG_BASE_URL: &str = "https://www.gog.com";

/// Prefixes protocol-relative URLs (GOG CDN style) with `https:`.
/// Absolute URLs pass through unchanged.
pub fn ensure_https(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https:{url}")
    }
}

fn absolutize_gog_link(link: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("{GOG_BASE_URL}{link}")
    }
}

/// Merges a scanned installer entry with whatever metadata the store
/// holds for its key.
pub fn merge_game_with_installer(metadata_root: &Path, entry: &InstallerEntry) -> Game {
    let mut game = Game {
        id: entry.key.clone(),
        key: entry.key.clone(),
        path_type: entry.kind.as_str().to_string(),
        installer_path: entry.fs_path.to_string_lossy().into_owned(),
        internal_path: entry.internal_path.clone(),
        display_name: entry.display_name.clone(),
        gog_title: None,
        gog_slug: None,
        gog_link: None,
        thumbnail: None,
        screenshots_local: Vec::new(),
        videos_local: Vec::new(),
        gog_search_name_override: None,
        description: String::new(),
        release_date: None,
    };

    if let Some(ov) = load_override(metadata_root, &entry.key) {
        game.gog_search_name_override = ov
            .gog_search_name
            .filter(|s| !s.trim().is_empty());
    }

    if let Some(stored) = load_game_json(metadata_root, &entry.key) {
        game.gog_title = stored.title;
        game.gog_slug = stored.slug;
        game.gog_link = stored
            .links
            .product_card
            .as_deref()
            .map(absolutize_gog_link);
        // Thumbnail preference: logo, then background, then icon.
        game.thumbnail = stored
            .images
            .logo
            .or(stored.images.background)
            .or(stored.images.icon)
            .as_deref()
            .map(ensure_https);
        game.screenshots_local = stored.screenshots_local;
        game.videos_local = stored.videos_local;
        game.description = stored.description;
        game.release_date = stored.release_date;
    }

    game
}

/// Builds a [`Game`] from stored metadata only (no scan), using the
/// installer facts recorded in `override.json`.
///
/// Returns `None` when the key has neither metadata nor an override —
/// the caller maps that to 404.
pub fn game_by_key(metadata_root: &Path, key: &str) -> Option<Game> {
    let ov = load_override(metadata_root, key);
    if ov.is_none() && load_game_json(metadata_root, key).is_none() {
        return None;
    }

    let ov = ov.unwrap_or_default();
    let entry = InstallerEntry {
        key: key.to_string(),
        kind: InstallerKind::parse(ov.path_type.as_deref().unwrap_or("file")),
        fs_path: ov.installer_path.clone().unwrap_or_default().into(),
        internal_path: ov.internal_path.clone(),
        display_name: ov.display_name.clone().unwrap_or_else(|| key.to_string()),
    };

    Some(merge_game_with_installer(metadata_root, &entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{save_game_json, save_override};
    use crate::types::{GameImages, GameJson, GameLinks, OverrideData};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entry(key: &str) -> InstallerEntry {
        InstallerEntry {
            key: key.into(),
            kind: InstallerKind::File,
            fs_path: PathBuf::from(format!("/games/{key}/setup_{key}.exe")),
            internal_path: None,
            display_name: key.replace('_', " "),
        }
    }

    #[test]
    fn ensure_https_handles_protocol_relative() {
        assert_eq!(
            ensure_https("//images.gog.com/abc.jpg"),
            "https://images.gog.com/abc.jpg"
        );
        assert_eq!(
            ensure_https("https://images.gog.com/abc.jpg"),
            "https://images.gog.com/abc.jpg"
        );
        assert_eq!(ensure_https("http://x/y.png"), "http://x/y.png");
    }

    #[test]
    fn merge_without_metadata_keeps_installer_facts() {
        let tmp = TempDir::new().unwrap();
        let game = merge_game_with_installer(tmp.path(), &entry("witcher"));

        assert_eq!(game.id, "witcher");
        assert_eq!(game.path_type, "file");
        assert_eq!(game.display_name, "witcher");
        assert!(game.gog_title.is_none());
        assert!(game.thumbnail.is_none());
    }

    #[test]
    fn merge_absolutizes_relative_store_link() {
        let tmp = TempDir::new().unwrap();
        let stored = GameJson {
            title: Some("The Witcher 3".into()),
            links: GameLinks {
                product_card: Some("/game/the_witcher_3".into()),
                ..GameLinks::default()
            },
            ..GameJson::default()
        };
        save_game_json(tmp.path(), "witcher", &stored).unwrap();

        let game = merge_game_with_installer(tmp.path(), &entry("witcher"));
        assert_eq!(
            game.gog_link.as_deref(),
            Some("https://www.gog.com/game/the_witcher_3")
        );
        assert_eq!(game.gog_title.as_deref(), Some("The Witcher 3"));
    }

    #[test]
    fn merge_thumbnail_prefers_logo_and_fixes_scheme() {
        let tmp = TempDir::new().unwrap();
        let stored = GameJson {
            images: GameImages {
                background: Some("//cdn.gog.com/bg.jpg".into()),
                logo: Some("//cdn.gog.com/logo.jpg".into()),
                icon: Some("//cdn.gog.com/icon.jpg".into()),
            },
            ..GameJson::default()
        };
        save_game_json(tmp.path(), "g", &stored).unwrap();

        let game = merge_game_with_installer(tmp.path(), &entry("g"));
        assert_eq!(
            game.thumbnail.as_deref(),
            Some("https://cdn.gog.com/logo.jpg")
        );
    }

    #[test]
    fn merge_thumbnail_falls_back_to_background() {
        let tmp = TempDir::new().unwrap();
        let stored = GameJson {
            images: GameImages {
                background: Some("https://cdn.gog.com/bg.jpg".into()),
                ..GameImages::default()
            },
            ..GameJson::default()
        };
        save_game_json(tmp.path(), "g", &stored).unwrap();

        let game = merge_game_with_installer(tmp.path(), &entry("g"));
        assert_eq!(game.thumbnail.as_deref(), Some("https://cdn.gog.com/bg.jpg"));
    }

    #[test]
    fn merge_surfaces_override_search_name() {
        let tmp = TempDir::new().unwrap();
        let ov = OverrideData {
            gog_search_name: Some("Witcher III".into()),
            ..OverrideData::default()
        };
        save_override(tmp.path(), "g", &ov).unwrap();

        let game = merge_game_with_installer(tmp.path(), &entry("g"));
        assert_eq!(game.gog_search_name_override.as_deref(), Some("Witcher III"));
    }

    #[test]
    fn game_by_key_none_when_nothing_stored() {
        let tmp = TempDir::new().unwrap();
        assert!(game_by_key(tmp.path(), "ghost").is_none());
    }

    #[test]
    fn game_by_key_uses_override_installer_facts() {
        let tmp = TempDir::new().unwrap();
        let ov = OverrideData {
            installer_path: Some("/archive/game.rar".into()),
            path_type: Some("rar".into()),
            internal_path: Some("setup_game.exe".into()),
            display_name: Some("Game".into()),
            ..OverrideData::default()
        };
        save_override(tmp.path(), "g", &ov).unwrap();

        let game = game_by_key(tmp.path(), "g").unwrap();
        assert_eq!(game.path_type, "rar");
        assert_eq!(game.installer_path, "/archive/game.rar");
        assert_eq!(game.internal_path.as_deref(), Some("setup_game.exe"));
        assert_eq!(game.display_name, "Game");
    }
}
