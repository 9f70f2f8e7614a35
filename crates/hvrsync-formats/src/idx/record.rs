//! File-info records

use crate::idx::error::{IdxError, Result};
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

/// Size of one file-info record in bytes
pub const RECORD_SIZE: usize = 16;

/// Type tag marking a record whose date/time fields were set by the camera
pub const DATE_PRESENT_TAG: [u8; 2] = *b"DT";

/// Years are stored relative to 2000
const YEAR_BASE: u16 = 2000;

/// One recorded segment in the index file
///
/// Layout (16 bytes, multi-byte integers big-endian):
/// - Type tag (2 bytes)
/// - Year - 2000, month, day, hour, minute, second (1 byte each)
/// - Packed start timecode: frames, seconds, minutes, hours (4 bytes)
/// - Total frame count (4 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct FileInfoRecord {
    /// Record type tag
    pub type_tag: [u8; 2],
    /// Year offset from 2000
    pub year: u8,
    /// Month
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
    /// Packed start timecode
    pub start_timecode: [u8; 4],
    /// Total frame count
    pub total_frames: u32,
}

impl FileInfoRecord {
    /// Create a record stamped with the given recording date/time
    ///
    /// The type tag is set to [`DATE_PRESENT_TAG`].
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<Self> {
        let year = year
            .checked_sub(YEAR_BASE)
            .and_then(|offset| u8::try_from(offset).ok())
            .ok_or_else(|| IdxError::CorruptIndex(format!("year {year} out of range")))?;
        Ok(Self {
            type_tag: DATE_PRESENT_TAG,
            year,
            month,
            day,
            hour,
            minute,
            second,
            start_timecode: [0; 4],
            total_frames: 0,
        })
    }

    /// Parse a record from its exact wire bytes
    pub fn parse(bytes: &[u8; RECORD_SIZE]) -> Result<Self> {
        Self::read(&mut Cursor::new(&bytes[..])).map_err(IdxError::from)
    }

    /// Serialize the record to its wire bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(RECORD_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Four-digit recording year
    pub fn full_year(&self) -> u16 {
        YEAR_BASE + u16::from(self.year)
    }

    /// Date/time stamp the camera puts in the clip's file names
    ///
    /// Formatted as `YYYY-MM-DD_hhmmss`, e.g. `2007-08-06_165555`.
    pub fn file_name_stamp(&self) -> String {
        format!(
            "{:02}-{:02}-{:02}_{:02}{:02}{:02}",
            self.full_year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }

    /// Whether the camera recorded a valid date for this segment
    pub fn has_recorded_date(&self) -> bool {
        self.type_tag == DATE_PRESENT_TAG
    }

    /// Creation timestamp as `YYYY-MM-DDThh:mm:ssZ`
    ///
    /// The camera's local clock is recorded verbatim and labelled UTC.
    pub fn creation_date(&self) -> Option<String> {
        self.has_recorded_date().then(|| {
            format!(
                "{:4}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                self.full_year(),
                self.month,
                self.day,
                self.hour,
                self.minute,
                self.second
            )
        })
    }
}
