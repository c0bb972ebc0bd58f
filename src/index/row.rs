use std::cmp::Reverse;

/// One row of the media index as a cursor sees it.
///
/// Mirrors the platform's audio table: `data` is the file path column and
/// `date_added` is stored in epoch seconds, as the OS records it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRow {
    pub data: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub date_added: Option<i64>,
    /// Milliseconds.
    pub duration: Option<i64>,
    pub is_music: bool,
}

/// Selection and ordering applied by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioQuery {
    pub min_duration_ms: i64,
}

impl AudioQuery {
    pub fn new(min_duration_ms: u64) -> Self {
        Self {
            min_duration_ms: i64::try_from(min_duration_ms).unwrap_or(i64::MAX),
        }
    }

    /// `is_music != 0 AND duration >= min`; a null duration never matches,
    /// as in SQL.
    pub fn matches(&self, row: &MediaRow) -> bool {
        row.is_music && row.duration.is_some_and(|d| d >= self.min_duration_ms)
    }

    /// `ORDER BY date_added DESC`, nulls last. Stable, so ties keep index order.
    pub fn sort(&self, rows: &mut [MediaRow]) {
        rows.sort_by_key(|r| Reverse(r.date_added.map_or(i128::MIN, i128::from)));
    }
}

impl Default for AudioQuery {
    fn default() -> Self {
        Self::new(10_000)
    }
}
