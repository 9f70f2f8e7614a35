//! Builder for constructing index files

use crate::idx::error::Result;
use crate::idx::frame_rate::FrameRate;
use crate::idx::header::IdxHeader;
use crate::idx::record::FileInfoRecord;

/// Builder for index file bytes
///
/// The record count written to the header defaults to the number of added
/// records. [`declared_count`](Self::declared_count) overrides it, which
/// is how mismatched files are produced for testing readers.
pub struct IdxFileBuilder {
    id: [u8; 8],
    valid_flag: u8,
    ecc_tb: u8,
    signal_mode: u8,
    declared_count: Option<usize>,
    records: Vec<FileInfoRecord>,
}

impl IdxFileBuilder {
    /// Create a new builder
    ///
    /// Defaults: HD signal mode 0x01, progressive, frame-rate bits 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: *b"HDV IDX ",
            valid_flag: 1,
            ecc_tb: 0x80,
            signal_mode: 0x01,
            declared_count: None,
            records: Vec::new(),
        }
    }

    /// Set the identification bytes
    #[must_use]
    pub fn id(mut self, id: [u8; 8]) -> Self {
        self.id = id;
        self
    }

    /// Set the valid flag byte
    #[must_use]
    pub fn valid_flag(mut self, flag: u8) -> Self {
        self.valid_flag = flag;
        self
    }

    /// Set the raw combined frame-rate code
    ///
    /// Codes 8 and above are written as interlaced with `code - 8` in the
    /// rate bits, lower codes as progressive.
    #[must_use]
    pub fn frame_rate_code(mut self, code: u8) -> Self {
        self.ecc_tb = if code >= 8 {
            (code - 8) & 0x07
        } else {
            0x80 | (code & 0x07)
        };
        self
    }

    /// Set a known frame rate
    #[must_use]
    pub fn frame_rate(self, rate: FrameRate) -> Self {
        self.frame_rate_code(rate.code())
    }

    /// Set the signal mode byte (0x00 or 0x80 for standard definition)
    #[must_use]
    pub fn signal_mode(mut self, mode: u8) -> Self {
        self.signal_mode = mode;
        self
    }

    /// Override the record count written to the header
    #[must_use]
    pub fn declared_count(mut self, count: usize) -> Self {
        self.declared_count = Some(count);
        self
    }

    /// Append a file-info record
    #[must_use]
    pub fn add_record(mut self, record: FileInfoRecord) -> Self {
        self.records.push(record);
        self
    }

    /// The header this builder would write
    pub fn header(&self) -> Result<IdxHeader> {
        let count = self.declared_count.unwrap_or(self.records.len());
        Ok(IdxHeader {
            id: self.id,
            valid_flag: self.valid_flag,
            reserved: 0,
            ecc_tb: self.ecc_tb,
            signal_mode: self.signal_mode,
            file_count_digits: IdxHeader::encode_file_count(count)?,
        })
    }

    /// Serialize header and records
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut data = self.header()?.build()?;
        for record in &self.records {
            data.extend(record.build()?);
        }
        Ok(data)
    }
}

impl Default for IdxFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
