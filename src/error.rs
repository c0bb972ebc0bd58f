use thiserror::Error;

/// Failures raised by a [`MediaIndex`](crate::index::MediaIndex) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The index itself cannot be reached (missing root, unopenable database).
    #[error("media index unavailable: {0}")]
    Unavailable(String),

    /// The query could not be prepared or executed.
    #[error("media index query failed: {0}")]
    Query(String),

    /// The cursor broke while rows were being read.
    #[error("media cursor failed: {0}")]
    Cursor(String),
}

/// A single malformed row. The scanner skips these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("column `{column}`: {message}")]
    Column { column: &'static str, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Storage permission not granted")]
    PermissionDenied,

    #[error("query failed: {0}")]
    QueryFailed(IndexError),

    #[error("{0}")]
    Fetch(String),
}

impl ScanError {
    /// Error code reported over the bridge channel.
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::PermissionDenied => "PERMISSION_DENIED",
            ScanError::QueryFailed(_) => "QUERY_FAILED",
            ScanError::Fetch(_) => "FETCH_ERROR",
        }
    }
}

impl From<IndexError> for ScanError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Cursor(msg) => ScanError::Fetch(msg),
            other => ScanError::QueryFailed(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_failures_become_fetch_errors() {
        let err: ScanError = IndexError::Cursor("step failed".into()).into();
        assert_eq!(err, ScanError::Fetch("step failed".into()));
        assert_eq!(err.code(), "FETCH_ERROR");
    }

    #[test]
    fn query_level_failures_stay_distinct() {
        let err: ScanError = IndexError::Unavailable("no db".into()).into();
        assert!(matches!(err, ScanError::QueryFailed(IndexError::Unavailable(_))));
        assert_eq!(err.code(), "QUERY_FAILED");
        assert_eq!(ScanError::PermissionDenied.code(), "PERMISSION_DENIED");
    }
}
