//! Tune book loading from plain `.abc` files or `.zip` archives.
//!
//! A zipped tune book is an archive of `.abc` files, typically a folder of
//! tunes zipped on a desktop. Entries are read in name order and their
//! tunes appended into a single book.

use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::error::LoadError;
use crate::tunebook::TuneBook;

/// Load a tune book from a file path.
/// Detects the format from the extension; anything but `.zip` is read as ABC text.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<TuneBook, LoadError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    load_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Load a tune book from raw bytes with an optional format hint.
/// Without a hint, ZIP data is recognised by its local-header signature.
pub fn load_bytes(data: &[u8], extension: Option<&str>) -> Result<TuneBook, LoadError> {
    let zipped = match extension {
        Some(ext) => ext.eq_ignore_ascii_case("zip"),
        None => data.starts_with(b"PK\x03\x04"),
    };
    if zipped {
        return load_zip(data);
    }
    let source = std::str::from_utf8(data)?;
    TuneBook::parse(source)
}

/// Read every `.abc` entry of a ZIP archive into one tune book.
///
/// Entries that are not valid ABC are skipped with a warning; the load
/// only fails when no entry yields a tune.
pub fn load_zip(data: &[u8]) -> Result<TuneBook, LoadError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_tune_entry(name))
        .map(str::to_string)
        .collect();
    names.sort();

    let mut book = TuneBook::default();
    for name in &names {
        match read_entry(&mut archive, name) {
            Ok(text) => match TuneBook::parse(&text) {
                Ok(part) => book.tunes.extend(part.tunes),
                Err(e) => log::warn!("Skipping '{name}' in archive: {e}"),
            },
            Err(e) => log::warn!("Skipping '{name}' in archive: {e}"),
        }
    }

    if book.is_empty() {
        return Err(LoadError::EmptyArchive);
    }
    log::info!("Loaded {} tunes from {} archive entries", book.len(), names.len());
    Ok(book)
}

/// `.abc` files outside macOS resource-fork folders.
fn is_tune_entry(name: &str) -> bool {
    !name.ends_with('/')
        && !name.starts_with("__MACOSX/")
        && !name.rsplit('/').next().is_some_and(|base| base.starts_with("._"))
        && name.to_ascii_lowercase().ends_with(".abc")
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, LoadError> {
    let mut file = archive.by_name(name)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| LoadError::Io {
        path: name.to_string(),
        source,
    })?;
    Ok(std::str::from_utf8(&bytes)?.to_string())
}
