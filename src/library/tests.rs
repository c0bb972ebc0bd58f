use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::{TempDir, tempdir};

use super::*;
use crate::config::ScannerSettings;
use crate::error::{IndexError, ScanError};
use crate::index::{MediaRow, MemoryMediaIndex, SqliteMediaIndex};
use crate::permission::{Permission, PermissionGate, PermissionHost};

struct Host(AtomicBool);

impl PermissionHost for Host {
    fn is_granted(&self, _permission: Permission) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn request(&self, _permission: Permission, _request_code: i32) {}
}

fn gate(granted: bool) -> Arc<PermissionGate> {
    Arc::new(PermissionGate::new(
        Arc::new(Host(AtomicBool::new(granted))),
        34,
        123,
    ))
}

/// Write a file of `size` bytes under `root`, creating parent folders.
fn media_file(root: &Path, rel: &str, size: usize) -> String {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, vec![0u8; size]).unwrap();
    path.to_str().unwrap().to_string()
}

fn row(path: &str, date_added: i64, duration: i64) -> MediaRow {
    MediaRow {
        data: Some(path.to_string()),
        title: Some("Title".into()),
        artist: Some("Artist".into()),
        album: Some("Album".into()),
        date_added: Some(date_added),
        duration: Some(duration),
        is_music: true,
    }
}

fn scanner(rows: Vec<MediaRow>) -> MediaLibraryScanner {
    MediaLibraryScanner::new(
        Arc::new(MemoryMediaIndex::new(rows)),
        gate(true),
        &ScannerSettings::default(),
    )
}

fn library() -> TempDir {
    tempdir().unwrap()
}

const BIG: usize = 64 * 1024;

#[test]
fn short_tracks_are_absent() {
    let dir = library();
    let ok = media_file(dir.path(), "Music/long.mp3", BIG);
    let short = media_file(dir.path(), "Music/short.mp3", BIG);

    let tracks = scanner(vec![row(&ok, 10, 10_000), row(&short, 20, 9_999)])
        .scan()
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, ok);
}

#[test]
fn denied_directory_segments_are_excluded_but_lookalikes_are_kept() {
    let dir = library();
    let whatsapp = media_file(dir.path(), "WhatsApp/Media/x.mp3", BIG);
    let lookalike = media_file(dir.path(), "WhatsAppXYZ/x.mp3", BIG);
    let recorder = media_file(dir.path(), "recorder/y.mp3", BIG);

    let tracks = scanner(vec![
        row(&whatsapp, 3, 60_000),
        row(&lookalike, 2, 60_000),
        row(&recorder, 1, 60_000),
    ])
    .scan()
    .unwrap();
    let paths: Vec<&str> = tracks.iter().map(|t| t.path.as_str()).collect();
    assert_eq!(paths, vec![lookalike.as_str()]);
}

#[test]
fn denied_extensions_are_excluded_in_any_directory() {
    let dir = library();
    let mut rows = Vec::new();
    for (i, name) in ["a.opus", "b.AMR", "c.m4r", "d.3gp", "e.Awb"].iter().enumerate() {
        let p = media_file(dir.path(), &format!("Music/{name}"), BIG);
        rows.push(row(&p, i as i64, 60_000));
    }
    let keep = media_file(dir.path(), "Music/f.mp3", BIG);
    rows.push(row(&keep, 99, 60_000));

    let tracks = scanner(rows).scan().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, keep);
}

#[test]
fn small_or_missing_files_are_excluded() {
    let dir = library();
    let small = media_file(dir.path(), "Music/small.mp3", 50 * 1024 - 1);
    let exact = media_file(dir.path(), "Music/exact.mp3", 50 * 1024);
    let missing = dir.path().join("Music/missing.mp3");

    let tracks = scanner(vec![
        row(&small, 3, 60_000),
        row(&exact, 2, 60_000),
        row(missing.to_str().unwrap(), 1, 60_000),
    ])
    .scan()
    .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, exact);
}

#[test]
fn rows_without_path_are_dropped() {
    let dir = library();
    let ok = media_file(dir.path(), "Music/ok.mp3", BIG);
    let mut no_path = row("", 5, 60_000);
    no_path.data = None;
    let empty_path = row("", 4, 60_000);

    let tracks = scanner(vec![no_path, empty_path, row(&ok, 1, 60_000)])
        .scan()
        .unwrap();
    assert_eq!(tracks.len(), 1);
}

#[test]
fn results_are_newest_first_in_milliseconds() {
    let dir = library();
    let a = media_file(dir.path(), "Music/a.mp3", BIG);
    let b = media_file(dir.path(), "Music/b.mp3", BIG);
    let c = media_file(dir.path(), "Music/c.mp3", BIG);

    let tracks = scanner(vec![
        row(&a, 1_700_000_000, 60_000),
        row(&b, 1_700_000_300, 60_000),
        row(&c, 1_700_000_100, 60_000),
    ])
    .scan()
    .unwrap();

    let dates: Vec<i64> = tracks.iter().map(|t| t.date_added.unwrap()).collect();
    assert_eq!(
        dates,
        vec![1_700_000_300_000, 1_700_000_100_000, 1_700_000_000_000]
    );
    assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(tracks[0].path, b);
}

#[test]
fn null_metadata_stays_absent() {
    let dir = library();
    let p = media_file(dir.path(), "Music/untagged.mp3", BIG);
    let bare = MediaRow {
        data: Some(p.clone()),
        date_added: None,
        duration: Some(42_000),
        is_music: true,
        ..MediaRow::default()
    };

    let tracks = scanner(vec![bare]).scan().unwrap();
    assert_eq!(tracks.len(), 1);
    let t = &tracks[0];
    assert_eq!(t.title, None);
    assert_eq!(t.artist, None);
    assert_eq!(t.album, None);
    assert_eq!(t.date_added, None);

    let record = t.to_record();
    assert_eq!(record.get("path").and_then(|v| v.as_str()), Some(p.as_str()));
    assert_eq!(record.get("duration").and_then(|v| v.as_i64()), Some(42_000));
    assert!(!record.contains_key("title"));
    assert!(!record.contains_key("artist"));
    assert!(!record.contains_key("album"));
    assert!(!record.contains_key("dateAdded"));
}

#[test]
fn permission_missing_is_reported_distinctly() {
    let s = MediaLibraryScanner::new(
        Arc::new(MemoryMediaIndex::default()),
        gate(false),
        &ScannerSettings::default(),
    );
    assert_eq!(s.scan(), Err(ScanError::PermissionDenied));
}

#[test]
fn query_failure_is_query_failed() {
    let s = MediaLibraryScanner::new(
        Arc::new(
            MemoryMediaIndex::default().failing_with(IndexError::Unavailable("no volume".into())),
        ),
        gate(true),
        &ScannerSettings::default(),
    );
    assert_eq!(
        s.scan(),
        Err(ScanError::QueryFailed(IndexError::Unavailable(
            "no volume".into()
        )))
    );
}

#[test]
fn broken_cursor_is_a_fetch_error() {
    let dir = library();
    let a = media_file(dir.path(), "Music/a.mp3", BIG);
    let index = MemoryMediaIndex::new(vec![row(&a, 2, 60_000), row(&a, 1, 60_000)])
        .breaking_after(1, IndexError::Cursor("cursor window full".into()));
    let s = MediaLibraryScanner::new(Arc::new(index), gate(true), &ScannerSettings::default());
    assert_eq!(s.scan(), Err(ScanError::Fetch("cursor window full".into())));
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = library();
    let a = media_file(dir.path(), "Music/a.mp3", BIG);
    let b = media_file(dir.path(), "Music/b.mp3", BIG);
    let index =
        MemoryMediaIndex::new(vec![row(&a, 2, 60_000), row(&b, 1, 60_000)]).with_malformed_row(0);
    let s = MediaLibraryScanner::new(Arc::new(index), gate(true), &ScannerSettings::default());
    let tracks = s.scan().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, b);
}

#[test]
fn sqlite_index_feeds_the_scanner() {
    let dir = library();
    let a = media_file(dir.path(), "Music/a.flac", BIG);
    let memo = media_file(dir.path(), "Recordings/memo.m4a", BIG);

    let index = SqliteMediaIndex::open_in_memory().unwrap();
    index
        .ingest(&[row(&a, 5, 180_000), row(&memo, 9, 180_000)])
        .unwrap();

    let s = MediaLibraryScanner::new(Arc::new(index), gate(true), &ScannerSettings::default());
    let tracks = s.scan().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, a);
    assert_eq!(tracks[0].title.as_deref(), Some("Title"));
    assert_eq!(tracks[0].date_added, Some(5_000));
}
