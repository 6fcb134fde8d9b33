//! The scan flow: discover, diff, resolve, persist, notify.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use gogshelf_notify::Notifier;
use gogshelf_scanner::{scan_installers, InstallerEntry};
use gogshelf_store::{
    load_override, load_scan_state, product_id_override, save_override, save_scan_state,
    search_name,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::resolver::MetadataResolver;
use crate::FlowError;

/// Everything a scan run needs.
pub struct ScanContext {
    pub installer_root: PathBuf,
    pub metadata_root: PathBuf,
    pub resolver: Arc<dyn MetadataResolver>,
    pub notifier: Arc<Notifier>,
    /// Whether to download screenshots and video thumbnails.
    pub download_assets: bool,
}

/// Outcome of a completed scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
    /// Per-game resolution failures; the scan itself still completed.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Runs a full scan.
///
/// New installers are resolved against GOG (search name overrides and
/// pinned product ids respected), installer facts are refreshed for every
/// game currently on disk, and the key set is persisted so the next run
/// can diff against it.
pub async fn run_scan(ctx: &ScanContext) -> Result<ScanSummary, FlowError> {
    ctx.notifier.scan_started().await;
    tokio::fs::create_dir_all(&ctx.metadata_root).await?;

    let entries = match scan_installers(&ctx.installer_root).await {
        Ok(entries) => entries,
        Err(e) => {
            ctx.notifier.error("Installer scan failed", &e.to_string()).await;
            return Err(e.into());
        }
    };

    let previous: HashSet<String> = load_scan_state(&ctx.metadata_root)
        .installer_keys
        .into_iter()
        .collect();
    let current_keys: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();
    let current: HashSet<&str> = current_keys.iter().map(String::as_str).collect();

    let mut added: Vec<&InstallerEntry> =
        entries.iter().filter(|e| !previous.contains(&e.key)).collect();
    added.sort_by(|a, b| a.key.cmp(&b.key));

    let mut removed: Vec<String> = previous
        .iter()
        .filter(|k| !current.contains(k.as_str()))
        .cloned()
        .collect();
    removed.sort();

    let mut errors = Vec::new();
    let mut resolved_titles: Vec<String> = Vec::new();

    for entry in &added {
        let name = search_name(&ctx.metadata_root, &entry.key, &entry.display_name);
        let product_id = product_id_override(&ctx.metadata_root, &entry.key);

        match ctx
            .resolver
            .resolve(&name, &ctx.metadata_root, &entry.key, product_id, ctx.download_assets)
            .await
        {
            Ok(Some(game)) => {
                resolved_titles.push(game.title.unwrap_or_else(|| name.clone()));
            }
            Ok(None) => {
                warn!(key = entry.key, name, "no GOG match");
                errors.push(format!("No GOG match: {} ({name})", entry.key));
            }
            Err(e) => {
                warn!(key = entry.key, "metadata resolution failed: {e}");
                errors.push(format!("{}: {e}", entry.key));
            }
        }
    }

    // Record where each installer currently lives so the API can answer
    // without rescanning. User overrides in the same file are kept.
    for entry in &entries {
        let mut ov = load_override(&ctx.metadata_root, &entry.key).unwrap_or_default();
        ov.installer_path = Some(entry.fs_path.to_string_lossy().into_owned());
        ov.path_type = Some(entry.kind.as_str().to_string());
        ov.internal_path = entry.internal_path.clone();
        ov.display_name = Some(entry.display_name.clone());
        // Seed the search name so a later refresh has something to use.
        if ov.gog_search_name.is_none() {
            ov.gog_search_name = Some(entry.display_name.clone());
        }
        save_override(&ctx.metadata_root, &entry.key, &ov)?;
    }

    save_scan_state(&ctx.metadata_root, &current_keys)?;

    // Only games that actually resolved are announced, under their
    // resolved titles.
    ctx.notifier.new_games(&resolved_titles).await;
    ctx.notifier.games_removed(&removed).await;
    if !errors.is_empty() {
        let detail: Vec<String> = errors.iter().take(5).cloned().collect();
        ctx.notifier.error("Scan had errors", &detail.join("\n")).await;
    }
    ctx.notifier
        .scan_finished(added.len(), removed.len(), resolved_titles.len(), entries.len())
        .await;

    let summary = ScanSummary {
        added: added.len(),
        removed: removed.len(),
        total: entries.len(),
        errors,
    };
    info!(
        added = summary.added,
        removed = summary.removed,
        total = summary.total,
        errors = summary.errors.len(),
        "scan finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gogshelf_gog::GogError;
    use gogshelf_store::{
        load_game_json, save_game_json, GameJson, OverrideData,
    };
    use std::future::Future;
    use std::path::Path;
    use std::pin::Pin;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every resolve call; writes `game.json` on success.
    #[derive(Default)]
    struct MockResolver {
        calls: Mutex<Vec<(String, String, Option<i64>)>>,
        fail_keys: Vec<String>,
        miss_keys: Vec<String>,
    }

    impl MockResolver {
        fn calls(&self) -> Vec<(String, String, Option<i64>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MetadataResolver for MockResolver {
        fn resolve<'a>(
            &'a self,
            search_name: &'a str,
            metadata_root: &'a Path,
            key: &'a str,
            product_id: Option<i64>,
            _download_assets: bool,
        ) -> Pin<Box<dyn Future<Output = Result<Option<GameJson>, GogError>> + Send + 'a>>
        {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap()
                    .push((key.to_string(), search_name.to_string(), product_id));

                if self.fail_keys.iter().any(|k| k == key) {
                    return Err(GogError::Api {
                        status: 500,
                        body: "boom".into(),
                    });
                }
                if self.miss_keys.iter().any(|k| k == key) {
                    return Ok(None);
                }

                let game = GameJson {
                    id: Some(1),
                    title: Some(search_name.to_string()),
                    ..GameJson::default()
                };
                save_game_json(metadata_root, key, &game)?;
                Ok(Some(game))
            })
        }
    }

    fn ctx(installers: &Path, metadata: &Path, resolver: Arc<MockResolver>) -> ScanContext {
        ScanContext {
            installer_root: installers.to_path_buf(),
            metadata_root: metadata.to_path_buf(),
            resolver,
            notifier: Arc::new(Notifier::disabled()),
            download_assets: false,
        }
    }

    #[tokio::test]
    async fn empty_roots_yield_empty_summary() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::default());

        let summary = run_scan(&ctx(installers.path(), metadata.path(), resolver.clone()))
            .await
            .unwrap();

        assert_eq!(summary.added, 0);
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.total, 0);
        assert!(summary.errors.is_empty());
        assert!(resolver.calls().is_empty());
        // State is still written so the next run has a baseline.
        assert!(load_scan_state(metadata.path()).last_scan.is_some());
    }

    #[tokio::test]
    async fn first_scan_resolves_and_records_facts() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        std::fs::create_dir_all(installers.path().join("The_Witcher_3")).unwrap();
        std::fs::write(
            installers.path().join("The_Witcher_3").join("setup_witcher3.exe"),
            b"X",
        )
        .unwrap();

        let resolver = Arc::new(MockResolver::default());
        let summary = run_scan(&ctx(installers.path(), metadata.path(), resolver.clone()))
            .await
            .unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.total, 1);
        assert!(summary.errors.is_empty());

        let key = "The_Witcher_3_setup_witcher3.exe";
        let calls = resolver.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, key);
        assert_eq!(calls[0].1, "The Witcher 3");
        assert_eq!(calls[0].2, None);

        // Resolver persisted metadata, flow persisted installer facts.
        assert!(load_game_json(metadata.path(), key).is_some());
        let ov = load_override(metadata.path(), key).unwrap();
        assert_eq!(ov.path_type.as_deref(), Some("file"));
        assert!(ov.installer_path.unwrap().ends_with("setup_witcher3.exe"));
        assert_eq!(ov.display_name.as_deref(), Some("The Witcher 3"));
        assert_eq!(ov.gog_search_name.as_deref(), Some("The Witcher 3"));

        assert_eq!(load_scan_state(metadata.path()).installer_keys, vec![key]);
    }

    #[tokio::test]
    async fn second_scan_skips_known_games() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        std::fs::write(installers.path().join("setup_game.exe"), b"X").unwrap();

        let first = Arc::new(MockResolver::default());
        run_scan(&ctx(installers.path(), metadata.path(), first)).await.unwrap();

        let second = Arc::new(MockResolver::default());
        let summary = run_scan(&ctx(installers.path(), metadata.path(), second.clone()))
            .await
            .unwrap();

        assert_eq!(summary.added, 0);
        assert_eq!(summary.total, 1);
        assert!(second.calls().is_empty());
    }

    #[tokio::test]
    async fn removed_installers_are_reported() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        save_scan_state(metadata.path(), &["ghost_key".into()]).unwrap();

        let resolver = Arc::new(MockResolver::default());
        let summary = run_scan(&ctx(installers.path(), metadata.path(), resolver))
            .await
            .unwrap();

        assert_eq!(summary.removed, 1);
        assert_eq!(summary.total, 0);
        assert!(load_scan_state(metadata.path()).installer_keys.is_empty());
    }

    #[tokio::test]
    async fn resolution_failures_do_not_abort_the_scan() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        std::fs::write(installers.path().join("setup_bad.exe"), b"X").unwrap();
        std::fs::write(installers.path().join("setup_missing.exe"), b"X").unwrap();

        let resolver = Arc::new(MockResolver {
            fail_keys: vec!["setup_bad.exe".into()],
            miss_keys: vec!["setup_missing.exe".into()],
            ..MockResolver::default()
        });
        let summary = run_scan(&ctx(installers.path(), metadata.path(), resolver))
            .await
            .unwrap();

        assert_eq!(summary.added, 2);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors.iter().any(|e| e.contains("boom")));
        assert!(summary.errors.iter().any(|e| e.contains("No GOG match")));
        // State is saved even with per-game failures.
        assert_eq!(load_scan_state(metadata.path()).installer_keys.len(), 2);
    }

    /// Captures webhook POST bodies; answers every request with 204.
    async fn capture_webhook() -> (String, Arc<Mutex<Vec<String>>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let captured = bodies.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let body = loop {
                    let n = match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break None,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&chunk[..n]);
                    let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                        continue;
                    };
                    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                    let len: usize = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break Some(
                            String::from_utf8_lossy(&buf[end + 4..end + 4 + len]).into_owned(),
                        );
                    }
                };
                if let Some(body) = body {
                    captured.lock().unwrap().push(body);
                }
                let _ = stream
                    .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                    .await;
                let _ = stream.shutdown().await;
            }
        });

        (url, bodies)
    }

    #[tokio::test]
    async fn new_games_notification_lists_resolved_titles_only() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        for dir in ["Good_Game", "Missing_Game"] {
            let d = installers.path().join(dir);
            std::fs::create_dir_all(&d).unwrap();
            std::fs::write(d.join(format!("setup_{}.exe", dir.to_lowercase())), b"X").unwrap();
        }

        let (url, bodies) = capture_webhook().await;
        let resolver = Arc::new(MockResolver {
            miss_keys: vec!["Missing_Game_setup_missing_game.exe".into()],
            ..MockResolver::default()
        });
        let ctx = ScanContext {
            notifier: Arc::new(Notifier::new(Some(url))),
            ..ctx(installers.path(), metadata.path(), resolver)
        };
        let summary = run_scan(&ctx).await.unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.errors.len(), 1);

        let bodies = bodies.lock().unwrap().clone();
        let new_games = bodies
            .iter()
            .find(|b| b.contains("New games detected"))
            .unwrap();
        assert!(new_games.contains("Good Game"));
        assert!(!new_games.contains("Missing Game"));

        let finished = bodies.iter().find(|b| b.contains("Scan finished")).unwrap();
        assert!(finished.contains("Added: 2"));
        assert!(finished.contains("Updated: 1"));
    }

    #[tokio::test]
    async fn overrides_steer_resolution() {
        let installers = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        std::fs::write(installers.path().join("setup_game.exe"), b"X").unwrap();

        let ov = OverrideData {
            gog_search_name: Some("Custom Name".into()),
            product_id: Some(42),
            ..OverrideData::default()
        };
        save_override(metadata.path(), "setup_game.exe", &ov).unwrap();

        let resolver = Arc::new(MockResolver::default());
        run_scan(&ctx(installers.path(), metadata.path(), resolver.clone()))
            .await
            .unwrap();

        let calls = resolver.calls();
        assert_eq!(calls[0].1, "Custom Name");
        assert_eq!(calls[0].2, Some(42));

        // The refresh of installer facts keeps the user's overrides.
        let ov = load_override(metadata.path(), "setup_game.exe").unwrap();
        assert_eq!(ov.gog_search_name.as_deref(), Some("Custom Name"));
        assert_eq!(ov.product_id, Some(42));
        assert!(ov.installer_path.is_some());
    }

}
