use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ScannerSettings;
use crate::error::ScanError;
use crate::index::{AudioQuery, MediaIndex, MediaRow};
use crate::permission::PermissionGate;

use super::filter::TrackFilter;
use super::model::Track;

/// Enumerates playable audio from the media index.
///
/// Holds no state between scans; every call re-checks the permission,
/// re-queries the index and builds a fresh track list.
pub struct MediaLibraryScanner {
    index: Arc<dyn MediaIndex>,
    gate: Arc<PermissionGate>,
    filter: TrackFilter,
    query: AudioQuery,
}

impl MediaLibraryScanner {
    pub fn new(
        index: Arc<dyn MediaIndex>,
        gate: Arc<PermissionGate>,
        settings: &ScannerSettings,
    ) -> Self {
        Self {
            index,
            gate,
            filter: TrackFilter::new(settings),
            query: AudioQuery::new(settings.min_duration_ms),
        }
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    /// Tracks in index order (newest first).
    ///
    /// `QueryFailed` means the index could not be queried at all; callers
    /// treat it as an empty library. `Fetch` means the cursor broke while
    /// reading.
    pub fn scan(&self) -> Result<Vec<Track>, ScanError> {
        if !self.gate.check() {
            return Err(ScanError::PermissionDenied);
        }

        let mut tracks: Vec<Track> = Vec::new();
        let mut skipped = 0usize;

        let queried = self.index.query(&self.query, &mut |row| match row {
            Ok(row) => match self.build_track(row) {
                Some(track) => tracks.push(track),
                None => skipped += 1,
            },
            Err(e) => {
                warn!(error = %e, "skipping malformed media row");
                skipped += 1;
            }
        });

        if let Err(e) = queried {
            let err = ScanError::from(e);
            if let ScanError::QueryFailed(cause) = &err {
                warn!(error = %cause, "media index query failed");
            }
            return Err(err);
        }

        info!(tracks = tracks.len(), skipped, "media scan finished");
        Ok(tracks)
    }

    fn build_track(&self, row: MediaRow) -> Option<Track> {
        let Some(path) = row.data else {
            debug!("skipping row without path");
            return None;
        };

        let verdict = self
            .filter
            .check_row(&path, row.duration)
            .and_then(|()| self.filter.check_file(&path));
        if let Err(reason) = verdict {
            debug!(path = %path, %reason, "skipping row");
            return None;
        }

        Some(Track {
            path,
            title: row.title,
            artist: row.artist,
            album: row.album,
            // The index records seconds.
            date_added: row.date_added.map(|secs| secs.saturating_mul(1000)),
            duration: row.duration,
        })
    }
}
