use crate::error::{IndexError, RowError};

use super::row::{AudioQuery, MediaRow};
use super::{MediaIndex, RowVisitor};

/// A fixed set of rows held in memory.
///
/// Used by the filesystem index after a walk, and by tests to stand in for
/// the platform media store (including its failures).
#[derive(Debug, Clone, Default)]
pub struct MemoryMediaIndex {
    rows: Vec<MediaRow>,
    fail_query: Option<IndexError>,
    fail_after: Option<(usize, IndexError)>,
    malformed: Vec<usize>,
}

impl MemoryMediaIndex {
    pub fn new(rows: Vec<MediaRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Make every query fail before any row is produced.
    pub fn failing_with(mut self, err: IndexError) -> Self {
        self.fail_query = Some(err);
        self
    }

    /// Make the cursor break after `n` matching rows were delivered.
    pub fn breaking_after(mut self, n: usize, err: IndexError) -> Self {
        self.fail_after = Some((n, err));
        self
    }

    /// Report the matching row at `position` as malformed instead of delivering it.
    pub fn with_malformed_row(mut self, position: usize) -> Self {
        self.malformed.push(position);
        self
    }
}

impl MediaIndex for MemoryMediaIndex {
    fn query(&self, query: &AudioQuery, visit: RowVisitor<'_>) -> Result<(), IndexError> {
        if let Some(err) = &self.fail_query {
            return Err(err.clone());
        }

        let mut matched: Vec<MediaRow> = self
            .rows
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        query.sort(&mut matched);

        for (pos, row) in matched.into_iter().enumerate() {
            if let Some((n, err)) = &self.fail_after {
                if pos == *n {
                    return Err(err.clone());
                }
            }
            if self.malformed.contains(&pos) {
                visit(Err(RowError::Column {
                    column: "date_added",
                    message: "expected integer".to_string(),
                }));
                continue;
            }
            visit(Ok(row));
        }
        Ok(())
    }
}
