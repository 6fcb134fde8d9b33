//! Shared server state.

use std::path::PathBuf;
use std::sync::Arc;

use gogshelf_notify::Notifier;
use gogshelf_scan::{MetadataResolver, ScanContext};
use tokio::sync::Mutex;

pub struct AppState {
    pub installer_root: PathBuf,
    pub metadata_root: PathBuf,
    pub resolver: Arc<dyn MetadataResolver>,
    pub notifier: Arc<Notifier>,
    /// Whether scans download screenshots and video thumbnails.
    pub download_assets: bool,
    /// Serializes scan runs; manual triggers and the scheduler share it.
    pub scan_lock: Mutex<()>,
}

impl AppState {
    pub fn scan_context(&self) -> ScanContext {
        ScanContext {
            installer_root: self.installer_root.clone(),
            metadata_root: self.metadata_root.clone(),
            resolver: self.resolver.clone(),
            notifier: self.notifier.clone(),
            download_assets: self.download_assets,
        }
    }
}
