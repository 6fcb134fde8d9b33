//! Scan orchestration.
//!
//! Ties the pieces together: discover installers on disk, diff them
//! against the previous scan, resolve new games against GOG, refresh the
//! recorded installer facts and persist the new scan state. Discord
//! notifications bracket the run.

mod flow;
mod resolver;

pub use flow::{run_scan, ScanContext, ScanSummary};
pub use resolver::MetadataResolver;

/// Errors that abort a scan run.
///
/// Per-game resolution failures do NOT abort the run; they are collected
/// in [`ScanSummary::errors`] instead.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("scan error: {0}")]
    Scan(#[from] gogshelf_scanner::ScanError),

    #[error("store error: {0}")]
    Store(#[from] gogshelf_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
