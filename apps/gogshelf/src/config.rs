//! Environment-based configuration.

use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root path where GOG installers live (exes or .rar archives).
    pub installer_root: PathBuf,
    /// Root path for metadata (game.json, screenshots, videos).
    pub metadata_root: PathBuf,
    pub port: u16,
    /// Cron expression or `daily` for automatic scans. `None` means
    /// scans run on demand only.
    pub schedule: Option<String>,
    pub discord_webhook_url: Option<String>,
    /// Whether scans download screenshots and video thumbnails.
    pub download_assets: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let installer_root = get("GOG_INSTALLER_PATH")
            .filter(|v| !v.trim().is_empty())
            .context("GOG_INSTALLER_PATH must be set")?;
        let metadata_root = get("GOG_METADATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .context("GOG_METADATA_PATH must be set")?;

        let port = match get("GOGSHELF_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("GOGSHELF_PORT is not a valid port: {raw:?}"))?,
            None => 8000,
        };

        let schedule = get("GOG_SCAN_SCHEDULE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let discord_webhook_url = get("DISCORD_WEBHOOK_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let download_assets = match get("GOG_DOWNLOAD_ASSETS") {
            Some(raw) => !matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            ),
            None => true,
        };

        Ok(Self {
            installer_root: PathBuf::from(installer_root),
            metadata_root: PathBuf::from(metadata_root),
            port,
            schedule,
            discord_webhook_url,
            download_assets,
        })
    }
}
