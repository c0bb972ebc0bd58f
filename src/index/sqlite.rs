use std::path::Path;

use rusqlite::{Connection, Row, params};
use tracing::{debug, warn};

use crate::error::{IndexError, RowError};

use super::row::{AudioQuery, MediaRow};
use super::{MediaIndex, RowVisitor};

const SELECT_AUDIO: &str = "SELECT _data, title, artist, album, date_added, duration
     FROM audio_media
     WHERE is_music != 0 AND duration >= ?1
     ORDER BY date_added DESC";

/// Media index persisted in SQLite, laid out like the platform's audio table.
///
/// `rusqlite::Connection` is not `Sync`, so the connection sits behind a mutex;
/// queries are short and never overlap in practice.
pub struct SqliteMediaIndex {
    conn: std::sync::Mutex<Connection>,
}

impl SqliteMediaIndex {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, IndexError> {
        let conn = Connection::open(db_path.as_ref()).map_err(|e| {
            IndexError::Unavailable(format!("{}: {e}", db_path.as_ref().display()))
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory().map_err(|e| IndexError::Unavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, IndexError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS audio_media (
                _id INTEGER PRIMARY KEY AUTOINCREMENT,
                _data TEXT,
                title TEXT,
                artist TEXT,
                album TEXT,
                date_added INTEGER, -- epoch seconds
                duration INTEGER,   -- milliseconds
                is_music INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_audio_date_added ON audio_media(date_added)",
            [],
        )
        .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }

    /// A visitor that panicked mid-query leaves the mutex poisoned, but the
    /// statement was already reset on unwind, so the connection is still good.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, IndexError> {
        Ok(self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("media index connection poisoned by an earlier panic; recovering");
            poisoned.into_inner()
        }))
    }

    #[cfg(test)]
    fn insert(&self, row: &MediaRow) -> Result<(), IndexError> {
        self.lock()?
            .execute(
                "INSERT INTO audio_media (_data, title, artist, album, date_added, duration, is_music)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.data,
                    row.title,
                    row.artist,
                    row.album,
                    row.date_added,
                    row.duration,
                    row.is_music,
                ],
            )
            .map_err(|e| IndexError::Query(e.to_string()))?;
        Ok(())
    }

    /// Replace the table contents with `rows` in one transaction.
    /// Returns the number of rows written.
    pub fn ingest(&self, rows: &[MediaRow]) -> Result<usize, IndexError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| IndexError::Query(e.to_string()))?;
        tx.execute("DELETE FROM audio_media", [])
            .map_err(|e| IndexError::Query(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO audio_media (_data, title, artist, album, date_added, duration, is_music)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| IndexError::Query(e.to_string()))?;
            for row in rows {
                stmt.execute(params![
                    row.data,
                    row.title,
                    row.artist,
                    row.album,
                    row.date_added,
                    row.duration,
                    row.is_music,
                ])
                .map_err(|e| IndexError::Query(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| IndexError::Query(e.to_string()))?;
        debug!(rows = rows.len(), "media index ingested");
        Ok(rows.len())
    }
}

fn column<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    idx: usize,
    name: &'static str,
) -> Result<Option<T>, RowError> {
    row.get::<_, Option<T>>(idx).map_err(|e| RowError::Column {
        column: name,
        message: e.to_string(),
    })
}

fn map_row(row: &Row<'_>) -> Result<MediaRow, RowError> {
    Ok(MediaRow {
        data: column(row, 0, "_data")?,
        title: column(row, 1, "title")?,
        artist: column(row, 2, "artist")?,
        album: column(row, 3, "album")?,
        date_added: column(row, 4, "date_added")?,
        duration: column(row, 5, "duration")?,
        // The WHERE clause only lets music rows through.
        is_music: true,
    })
}

impl MediaIndex for SqliteMediaIndex {
    fn query(&self, query: &AudioQuery, visit: RowVisitor<'_>) -> Result<(), IndexError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(SELECT_AUDIO)
            .map_err(|e| IndexError::Query(e.to_string()))?;
        let mut rows = stmt
            .query(params![query.min_duration_ms])
            .map_err(|e| IndexError::Query(e.to_string()))?;

        // `rows` and `stmt` are dropped on every exit path, releasing the cursor.
        loop {
            match rows.next() {
                Ok(Some(row)) => visit(map_row(row)),
                Ok(None) => return Ok(()),
                Err(e) => return Err(IndexError::Cursor(e.to_string())),
            }
        }
    }
}
