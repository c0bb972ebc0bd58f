use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::config::IndexSettings;
use crate::error::IndexError;

use super::memory::MemoryMediaIndex;
use super::row::{AudioQuery, MediaRow};
use super::{MediaIndex, RowVisitor};

/// Folders the platform media scanner files as ringtones and alerts rather than music.
const NON_MUSIC_DIRS: &[&str] = &["ringtones", "notifications", "alarms"];

/// Media index built by walking directories on demand.
///
/// Every query re-walks the configured roots, so the result always reflects
/// what is on disk at that moment.
#[derive(Debug, Clone)]
pub struct FsMediaIndex {
    roots: Vec<PathBuf>,
    settings: IndexSettings,
}

impl FsMediaIndex {
    pub fn new(settings: &IndexSettings) -> Self {
        Self {
            roots: settings.roots.clone(),
            settings: settings.clone(),
        }
    }

    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Walk every root and collect the raw rows, before any query filtering.
    pub fn collect_rows(&self) -> Result<Vec<MediaRow>, IndexError> {
        if self.roots.is_empty() {
            return Err(IndexError::Unavailable("no index roots configured".into()));
        }

        let (present, missing): (Vec<&PathBuf>, Vec<&PathBuf>) =
            self.roots.iter().partition(|root| root.is_dir());
        if present.is_empty() {
            return Err(IndexError::Unavailable(format!(
                "no index root is a directory: {}",
                missing
                    .iter()
                    .map(|root| root.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        for root in missing {
            warn!(root = %root.display(), "index root is not a directory; skipping");
        }

        let mut rows = Vec::new();
        for root in present {
            self.walk(root, &mut rows);
        }
        debug!(rows = rows.len(), "filesystem index walk finished");
        Ok(rows)
    }

    fn walk(&self, root: &Path, rows: &mut Vec<MediaRow>) {
        let mut walker = WalkDir::new(root).follow_links(self.settings.follow_links);
        if let Some(d) = self.settings.max_depth {
            walker = walker.max_depth(d);
        }

        let include_hidden = self.settings.include_hidden;
        for entry in walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if path.is_file() && is_audio_file(path, &self.settings.extensions) {
                rows.push(read_row(path));
            }
        }
    }
}

impl MediaIndex for FsMediaIndex {
    fn query(&self, query: &AudioQuery, visit: RowVisitor<'_>) -> Result<(), IndexError> {
        MemoryMediaIndex::new(self.collect_rows()?).query(query, visit)
    }
}

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .any(|e| !e.is_empty() && e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_music_location(path: &Path) -> bool {
    !path.components().any(|c| match c {
        Component::Normal(seg) => seg
            .to_str()
            .map(|s| NON_MUSIC_DIRS.contains(&s.to_ascii_lowercase().as_str()))
            .unwrap_or(false),
        _ => false,
    })
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Build a row for one file. Unreadable tags leave the text columns and
/// duration null, as the platform scanner does for files it cannot parse.
fn read_row(path: &Path) -> MediaRow {
    let date_added = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_secs()).ok());

    let mut row = MediaRow {
        data: path.to_str().map(str::to_string),
        date_added,
        is_music: is_music_location(path),
        ..MediaRow::default()
    };

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            row.duration = i64::try_from(tagged.properties().duration().as_millis()).ok();
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                row.title = non_empty(tag.title());
                row.artist = non_empty(tag.artist());
                row.album = non_empty(tag.album());
            }
        }
        Err(e) => trace!(path = %path.display(), error = %e, "unreadable audio tags"),
    }

    row
}
