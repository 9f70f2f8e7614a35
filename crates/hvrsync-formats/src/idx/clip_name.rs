//! Validated clip names
//!
//! A fully-qualified HDV clip name looks like `00_0001_2007-08-06_165555`:
//! an 8-byte camera/clip prefix (`00_0001_`) followed by the recording
//! date and time. Short logical names (`00_0001`) are accepted too, but
//! only the fully-qualified form carries the date/time suffix needed to
//! pick a record out of the index file.

use crate::idx::error::{IdxError, Result};
use std::fmt;

/// Length of a fully-qualified clip name
pub const CLIP_NAME_LEN: usize = 25;

/// Offset of the date/time suffix inside a fully-qualified clip name
const DATE_TIME_OFFSET: usize = 8;

/// Clip name checked against the fixed clip-name length
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipName(String);

impl ClipName {
    /// Validate a clip name
    ///
    /// Names longer than [`CLIP_NAME_LEN`] are rejected here, before any
    /// file is touched.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(IdxError::InvalidClipName(name.to_string()));
        }
        if name.len() > CLIP_NAME_LEN {
            return Err(IdxError::ClipNameTooLong {
                len: name.len(),
                max: CLIP_NAME_LEN,
            });
        }
        Ok(Self(name.to_string()))
    }

    /// The name as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recording date/time suffix (`YYYY-MM-DD_hhmmss`)
    ///
    /// Only fully-qualified names have one.
    pub fn date_time_suffix(&self) -> Option<&str> {
        if self.0.len() == CLIP_NAME_LEN {
            self.0.get(DATE_TIME_OFFSET..)
        } else {
            None
        }
    }

    /// Whether this is a fully-qualified clip name
    pub fn is_fully_qualified(&self) -> bool {
        self.date_time_suffix().is_some()
    }
}

impl fmt::Display for ClipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
