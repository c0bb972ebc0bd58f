use std::fmt;
use std::path::{Component, Path};

use crate::config::ScannerSettings;

/// Why a row did not become a [`Track`](super::Track).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NoPath,
    DeniedDir(String),
    DeniedExtension(String),
    TooShort(i64),
    Missing,
    TooSmall(u64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoPath => write!(f, "no path"),
            Rejection::DeniedDir(d) => write!(f, "denied directory {d}"),
            Rejection::DeniedExtension(e) => write!(f, "denied extension {e}"),
            Rejection::TooShort(ms) => write!(f, "too short ({ms} ms)"),
            Rejection::Missing => write!(f, "file missing"),
            Rejection::TooSmall(bytes) => write!(f, "file too small ({bytes} bytes)"),
        }
    }
}

/// Inclusion rules applied to every row the index returns.
///
/// Directory names match whole path segments, case-insensitively, so
/// `/storage/WhatsApp/Media/x.mp3` is rejected and `/storage/WhatsAppXYZ/x.mp3`
/// is not. Extensions match the dotted suffix of the file name.
#[derive(Debug, Clone)]
pub struct TrackFilter {
    min_file_size_bytes: u64,
    min_duration_ms: i64,
    denied_dirs: Vec<String>,
    denied_suffixes: Vec<String>,
}

impl TrackFilter {
    pub fn new(settings: &ScannerSettings) -> Self {
        let denied_dirs = settings
            .denied_dirs
            .iter()
            .map(|d| d.trim().trim_matches('/').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        let denied_suffixes = settings
            .denied_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{e}"))
            .collect();

        Self {
            min_file_size_bytes: settings.min_file_size_bytes,
            min_duration_ms: i64::try_from(settings.min_duration_ms).unwrap_or(i64::MAX),
            denied_dirs,
            denied_suffixes,
        }
    }

    /// First directory segment of `path` that is on the denylist.
    pub fn denied_dir<'a>(&self, path: &'a str) -> Option<&'a str> {
        let parent = Path::new(path).parent()?;
        parent.components().find_map(|c| match c {
            Component::Normal(seg) => seg
                .to_str()
                .filter(|s| self.denied_dirs.iter().any(|d| *d == s.to_lowercase())),
            _ => None,
        })
    }

    /// Denylisted dotted suffix the file name ends with.
    pub fn denied_extension(&self, path: &str) -> Option<&str> {
        let name = Path::new(path).file_name()?.to_str()?.to_lowercase();
        self.denied_suffixes
            .iter()
            .find(|suffix| name.ends_with(suffix.as_str()))
            .map(String::as_str)
    }

    /// Checks that need only the row itself.
    pub fn check_row(&self, path: &str, duration_ms: Option<i64>) -> Result<(), Rejection> {
        if path.trim().is_empty() {
            return Err(Rejection::NoPath);
        }
        if let Some(dir) = self.denied_dir(path) {
            return Err(Rejection::DeniedDir(dir.to_string()));
        }
        if let Some(ext) = self.denied_extension(path) {
            return Err(Rejection::DeniedExtension(ext.to_string()));
        }
        match duration_ms {
            Some(ms) if ms < self.min_duration_ms => Err(Rejection::TooShort(ms)),
            _ => Ok(()),
        }
    }

    /// Checks against the backing file on disk.
    pub fn check_file(&self, path: &str) -> Result<(), Rejection> {
        let meta = std::fs::metadata(path).map_err(|_| Rejection::Missing)?;
        if !meta.is_file() {
            return Err(Rejection::Missing);
        }
        if meta.len() < self.min_file_size_bytes {
            return Err(Rejection::TooSmall(meta.len()));
        }
        Ok(())
    }
}
