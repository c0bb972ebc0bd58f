//! Media index abstraction and its backends.
//!
//! A [`MediaIndex`] answers an [`AudioQuery`] by handing rows to a visitor
//! one at a time. Whatever cursor or statement a backend opens lives only
//! for the duration of [`MediaIndex::query`] and is released on every exit
//! path, including errors.

mod fs;
mod memory;
mod row;
mod sqlite;

pub use fs::FsMediaIndex;
pub use memory::MemoryMediaIndex;
pub use row::{AudioQuery, MediaRow};
pub use sqlite::SqliteMediaIndex;

use crate::error::{IndexError, RowError};

pub type RowVisitor<'a> = &'a mut dyn FnMut(Result<MediaRow, RowError>);

pub trait MediaIndex: Send + Sync {
    /// Stream every row matching `query`, in query order.
    ///
    /// Returns `Err` when the query cannot run (`Unavailable`, `Query`) or
    /// the cursor breaks midway (`Cursor`). Malformed individual rows are
    /// reported through the visitor instead.
    fn query(&self, query: &AudioQuery, visit: RowVisitor<'_>) -> Result<(), IndexError>;
}

/// Run `query` and collect everything the visitor would have seen.
#[cfg(test)]
pub(crate) fn query_rows(
    index: &dyn MediaIndex,
    query: &AudioQuery,
) -> Result<Vec<Result<MediaRow, RowError>>, IndexError> {
    let mut out = Vec::new();
    index.query(query, &mut |row| out.push(row))?;
    Ok(out)
}
