//! Error types for the HDV index format

use thiserror::Error;

/// Errors that can occur when decoding or building HDV index files
#[derive(Debug, Error)]
pub enum IdxError {
    /// Clip name exceeds the fixed clip-name length
    #[error("Clip name too long: {len} bytes (maximum {max})")]
    ClipNameTooLong {
        /// Length of the rejected name
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Clip name is empty or otherwise unusable
    #[error("Invalid clip name: {0:?}")]
    InvalidClipName(String),

    /// No file-info record matches the clip's recorded date/time
    #[error("No file-info record matches clip '{clip}' ({scanned} records scanned)")]
    RecordNotFound {
        /// Clip name that was searched for
        clip: String,
        /// Number of records examined before giving up
        scanned: u16,
    },

    /// Stream ended before a complete block could be read
    #[error("Truncated index: expected {expected} bytes at offset {offset}, got {actual}")]
    TruncatedIndex {
        /// Byte offset of the block that was being read
        offset: u64,
        /// Block size in bytes
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Structurally invalid index data
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Too many records to express in the four-digit record counter
    #[error("Too many file-info records: {0} (maximum 9999)")]
    TooManyRecords(usize),

    /// Binary read error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// IO error during parsing or building
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for IdxError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}

impl IdxError {
    /// Whether this error only means "no matching technical data"
    ///
    /// Callers treat these as a signal to leave metadata untouched rather
    /// than as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IdxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdxError::TruncatedIndex {
            offset: 64,
            expected: 16,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("16"));
        assert!(msg.contains('3'));

        let err = IdxError::ClipNameTooLong { len: 30, max: 25 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_not_found_classification() {
        let err = IdxError::RecordNotFound {
            clip: "00_0001_2007-08-06_165555".to_string(),
            scanned: 2,
        };
        assert!(err.is_not_found());
        assert!(!IdxError::CorruptIndex("bad".to_string()).is_not_found());
    }
}
