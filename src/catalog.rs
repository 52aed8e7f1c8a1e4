//! Tune and document catalogs — indexes of every `.abc` or `.md` file
//! under a directory.
//!
//! Each tune file becomes one entry named by its first title. Files in
//! subfolders are grouped by folder; files at the root land in
//! [`ROOT_CATEGORY`]. Symbolic links are listed but never followed, so a
//! link back to an ancestor cannot make the scan recurse.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::tunebook::extract_title;

pub const ROOT_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Tune title, or the file stem when the file has none
    pub name: String,
    /// Path relative to the scanned root, `/`-separated
    pub file: String,
    pub category: String,
}

/// A Markdown document in a docs folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub name: String,
    pub file: String,
}

/// Scan `root` recursively. Entries are sorted by category, then name.
///
/// Unreadable files still get an entry named after the file.
pub fn scan<P: AsRef<Path>>(root: P) -> Result<Vec<CatalogEntry>, LoadError> {
    let root = root.as_ref();
    let mut entries: Vec<CatalogEntry> = collect_files(root, "abc")?
        .iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(root).ok()?;
            Some(entry_for(path, relative))
        })
        .collect();

    entries.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    log::info!("Catalogued {} tunes under {}", entries.len(), root.display());
    Ok(entries)
}

/// Scan `root` recursively for Markdown documents, sorted by name.
///
/// The name is the first `# ` heading, or the file stem in title case
/// with underscores read as spaces.
pub fn scan_docs<P: AsRef<Path>>(root: P) -> Result<Vec<DocEntry>, LoadError> {
    let root = root.as_ref();
    let mut entries: Vec<DocEntry> = collect_files(root, "md")?
        .iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(root).ok()?;
            Some(DocEntry { name: doc_title(path), file: slash_path(relative) })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    log::info!("Catalogued {} documents under {}", entries.len(), root.display());
    Ok(entries)
}

/// Non-directory entries under `root` with the given extension.
///
/// A missing or unreadable root is an error; unreadable entries below it
/// are skipped with a warning.
fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(LoadError::Io { path: root.display().to_string(), source: e.into() });
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case(extension)) {
            files.push(path);
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn entry_for(path: &Path, relative: &Path) -> CatalogEntry {
    let stem = file_stem(path);

    let name = match std::fs::read_to_string(path) {
        Ok(text) => extract_title(&text).filter(|t| !t.is_empty()).unwrap_or(stem),
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            stem
        }
    };

    let category = relative
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(slash_path)
        .unwrap_or_else(|| ROOT_CATEGORY.to_string());

    CatalogEntry { name, file: slash_path(relative), category }
}

fn doc_title(path: &Path) -> String {
    let heading = match std::fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()),
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            None
        }
    };
    heading.unwrap_or_else(|| title_case(&file_stem(path).replace('_', " ")))
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert a tune or document catalog to a JSON string.
/// Useful for passing the catalog across FFI boundaries.
pub fn catalog_to_json<T: Serialize>(entries: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}
