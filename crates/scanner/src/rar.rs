//! RAR archive listing via the external `unrar` utility.

use std::path::Path;

use crate::ScanError;

/// Lists the file names inside a RAR archive.
///
/// Runs `unrar lb` (bare listing, one entry per line). Errors if the
/// binary is not installed or the archive cannot be read; callers treat
/// that as "no entries" rather than failing the whole scan.
pub async fn list_rar_entries(archive: &Path) -> Result<Vec<String>, ScanError> {
    let output = tokio::process::Command::new("unrar")
        .arg("lb")
        .arg(archive)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ScanError::Archive(format!(
            "unrar exited with {} for {}",
            output.status,
            archive.display()
        )));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Ok(listing
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
