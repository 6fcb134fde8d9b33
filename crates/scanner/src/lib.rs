//! Installer discovery for the gogshelf library.
//!
//! Walks the installer root looking for GOG offline installers:
//! `setup_*.exe` files directly on disk, and the same inside `.rar`
//! archives (listed via the external `unrar` utility). Every discovered
//! installer gets a stable key derived from its path, which names the
//! game's metadata folder.

mod rar;

pub use rar::list_rar_entries;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Errors from installer discovery.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(String),
}

/// How an installer was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// A `setup_*.exe` file directly on disk.
    File,
    /// A `setup_*.exe` inside a `.rar` archive.
    Rar,
}

impl InstallerKind {
    /// Returns the wire name used in stored metadata (`"file"` / `"rar"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallerKind::File => "file",
            InstallerKind::Rar => "rar",
        }
    }

    /// Parses a wire name, defaulting to [`InstallerKind::File`].
    pub fn parse(s: &str) -> Self {
        match s {
            "rar" => InstallerKind::Rar,
            _ => InstallerKind::File,
        }
    }
}

/// A single discovered installer.
#[derive(Debug, Clone)]
pub struct InstallerEntry {
    /// Stable identity used to name the metadata folder.
    pub key: String,
    pub kind: InstallerKind,
    /// Path to the `.exe` file or the `.rar` archive.
    pub fs_path: PathBuf,
    /// For RAR entries, the exe's path inside the archive.
    pub internal_path: Option<String>,
    /// Derived name used as the default GOG search term.
    pub display_name: String,
}

/// Returns `true` if `name` looks like a GOG offline installer executable.
pub fn is_setup_exe(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("setup_") && lower.ends_with(".exe")
}

/// Builds a filesystem-safe key from a root-relative path.
///
/// Path separators and the characters `:*?"<>|` become `_`; for RAR
/// entries the internal path is appended the same way. An empty result
/// falls back to `"unknown"`.
pub fn sanitize_key(relative: &str, internal: Option<&str>) -> String {
    let mut key: String = relative
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    if let Some(internal) = internal {
        key.push('_');
        key.extend(
            internal
                .chars()
                .map(|c| if c == '\\' || c == '/' { '_' } else { c }),
        );
    }

    let trimmed = key.trim_matches('_');
    if trimmed.is_empty() {
        "unknown".into()
    } else {
        trimmed.to_string()
    }
}

/// Returns the part number if `name` ends with `.partN.rar`.
fn rar_part_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let rest = lower.strip_suffix(".rar")?;
    let (_, last) = rest.rsplit_once('.')?;
    let digits = last.strip_prefix("part")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Returns `true` for archives worth opening: single `.rar` files and
/// the first part of multi-part sets.
fn is_first_rar_part(name: &str) -> bool {
    if !name.to_ascii_lowercase().ends_with(".rar") {
        return false;
    }
    match rar_part_number(name) {
        Some(part) => part == 1,
        None => true,
    }
}

/// Archive stem with any `.partN` suffix stripped, for deduplicating
/// logical multi-part archives.
fn rar_base_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('.') {
        Some((base, last))
            if last.len() > 4
                && last.to_ascii_lowercase().starts_with("part")
                && last[4..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            base.to_string()
        }
        _ => stem,
    }
}

/// Derives a human-readable name used as the GOG search term.
///
/// RAR entries use the archive stem (minus any `.partN`); direct exes use
/// the parent directory name. Underscores become spaces.
fn display_name_for(fs_path: &Path, internal: Option<&str>) -> String {
    if internal.is_some() {
        let stem = rar_base_stem(fs_path);
        let name = stem.replace('_', " ").trim().to_string();
        if !name.is_empty() {
            return name;
        }
        return fs_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".into());
    }

    if let Some(parent) = fs_path.parent().and_then(|p| p.file_name()) {
        let name = parent.to_string_lossy().replace('_', " ").trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }

    let stem = fs_path
        .file_stem()
        .map(|s| s.to_string_lossy().replace('_', " ").trim().to_string())
        .unwrap_or_default();
    if stem.is_empty() { "Unknown".into() } else { stem }
}

/// Recursively discovers all installers under `root`.
///
/// Direct `setup_*.exe` files are collected first, then entries found
/// inside `.rar` archives. For multi-part archives only the first part is
/// opened, and a logical archive is never listed twice. Keys are
/// deduplicated across the whole scan. A missing or non-directory root
/// yields an empty list.
pub async fn scan_installers(root: &Path) -> Result<Vec<InstallerEntry>, ScanError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut entries = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for path in &files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };
        if !is_setup_exe(&name) {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let key = sanitize_key(&rel.to_string_lossy(), None);
        if seen_keys.insert(key.clone()) {
            entries.push(InstallerEntry {
                key,
                kind: InstallerKind::File,
                fs_path: path.clone(),
                internal_path: None,
                display_name: display_name_for(path, None),
            });
        }
    }

    let mut seen_bases: HashSet<String> = HashSet::new();
    for path in &files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };
        if !is_first_rar_part(&name) {
            continue;
        }
        if !seen_bases.insert(rar_base_stem(path)) {
            continue;
        }

        let names = match list_rar_entries(path).await {
            Ok(names) => names,
            Err(e) => {
                warn!(archive = %path.display(), "skipping unreadable archive: {e}");
                continue;
            }
        };

        for internal in names {
            let base = internal.replace('\\', "/");
            let base = base.rsplit('/').next().unwrap_or(&base);
            if !is_setup_exe(base) {
                continue;
            }
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let key = sanitize_key(&rel.to_string_lossy(), Some(&internal));
            if seen_keys.insert(key.clone()) {
                entries.push(InstallerEntry {
                    key,
                    kind: InstallerKind::Rar,
                    fs_path: path.clone(),
                    internal_path: Some(internal.clone()),
                    display_name: display_name_for(path, Some(&internal)),
                });
            }
        }
    }

    Ok(entries)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let entries = std::fs::read_dir(dir)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            collect_files(&path, files)?;
        } else if metadata.is_file() {
            files.push(path);
        }
    }

    Ok(())
}
