//! Loading tune books and catalogs from disk.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use fingerlib::archive::{load_bytes, load_file};
use fingerlib::catalog::{catalog_to_json, scan, scan_docs, CatalogEntry, DocEntry, ROOT_CATEGORY};
use fingerlib::render::RenderedTune;
use fingerlib::LoadError;
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn load_session_file() {
    let book = load_file(fixture("session.abc")).unwrap();
    assert_eq!(book.titles(), vec![Some("The Kesh"), Some("Three Notes")]);

    let kesh = book.select(0).unwrap().metadata();
    assert_eq!(kesh.tempo_bpm, Some(116.0));
    assert_eq!(kesh.meter.as_deref(), Some("6/8"));
    assert_eq!(book.select(1).unwrap().key.as_deref(), Some("C"));
}

#[test]
fn missing_file_reports_path() {
    match load_file(fixture("nope.abc")) {
        Err(LoadError::Io { path, .. }) => assert!(path.ends_with("nope.abc")),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn zipped_tune_folder() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory("jigs/", options).unwrap();
    writer.start_file("jigs/session.abc", options).unwrap();
    writer.write_all(fs::read(fixture("session.abc")).unwrap().as_slice()).unwrap();
    writer.start_file("__MACOSX/jigs/._session.abc", options).unwrap();
    writer.write_all(&[0, 5, 22, 7]).unwrap();
    let data = writer.finish().unwrap().into_inner();

    let book = load_bytes(&data, Some("zip")).unwrap();
    assert_eq!(book.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════════════════════════════════

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[test]
fn catalog_groups_by_folder_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "kesh.abc", "X:1\nT:The Kesh\nK:G\n");
    write(dir.path(), "butterfly.abc", "X:1\nT:Butterfly\nK:Em\n");
    write(dir.path(), "reels/maggie.abc", "X:1\nT:Drowsy Maggie\nK:Edor\n");
    write(dir.path(), "reels/untitled_reel.abc", "X:1\nK:D\n");
    write(dir.path(), "reels/notes.txt", "not a tune");

    let entries = scan(dir.path()).unwrap();
    let entry = |name: &str, file: &str, category: &str| CatalogEntry {
        name: name.into(),
        file: file.into(),
        category: category.into(),
    };
    assert_eq!(
        entries,
        vec![
            entry("Butterfly", "butterfly.abc", ROOT_CATEGORY),
            entry("The Kesh", "kesh.abc", ROOT_CATEGORY),
            entry("Drowsy Maggie", "reels/maggie.abc", "reels"),
            entry("untitled_reel", "reels/untitled_reel.abc", "reels"),
        ]
    );

    let json: serde_json::Value = serde_json::from_str(&catalog_to_json(&entries).unwrap()).unwrap();
    assert_eq!(json[2]["file"], "reels/maggie.abc");
    assert_eq!(json[0]["category"], "General");
}

#[test]
fn catalog_of_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(scan(dir.path().join("absent")), Err(LoadError::Io { .. })));
}

#[cfg(unix)]
#[test]
fn catalog_does_not_follow_link_cycles() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "reels/maggie.abc", "X:1\nT:Drowsy Maggie\nK:Edor\n");
    std::os::unix::fs::symlink(dir.path(), dir.path().join("reels/loop")).unwrap();

    let entries = scan(dir.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file, "reels/maggie.abc");
}

#[test]
fn docs_catalog_uses_headings_then_stems() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "whistle_basics.md", "Intro text\n\n# Whistle Basics\n\n## Holding\n");
    write(dir.path(), "guides/reading_abc.md", "No heading here.\n");
    write(dir.path(), "guides/tune.abc", "X:1\nK:D\n");

    let docs = scan_docs(dir.path()).unwrap();
    assert_eq!(
        docs,
        vec![
            DocEntry { name: "Reading Abc".into(), file: "guides/reading_abc.md".into() },
            DocEntry { name: "Whistle Basics".into(), file: "whistle_basics.md".into() },
        ]
    );
    assert!(catalog_to_json(&docs).unwrap().contains("\"file\": \"guides/reading_abc.md\""));
}
