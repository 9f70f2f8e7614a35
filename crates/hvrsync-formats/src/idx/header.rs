//! Index file header parsing and building

use crate::idx::error::{IdxError, Result};
use crate::idx::frame_rate::FrameRate;
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

/// Size of the fixed index header in bytes
pub const HEADER_SIZE: usize = 16;

/// Progressive-scan flag in the `ecc_tb` byte
const PROGRESSIVE_FLAG: u8 = 0x80;

/// Mask for the frame-rate bits in the `ecc_tb` byte
const FRAME_RATE_MASK: u8 = 0x07;

/// Offset added to the frame-rate bits for interlaced clips
const INTERLACED_RATE_OFFSET: u8 = 8;

/// Index file header
///
/// Layout (16 bytes):
/// - Identification/reserved (8 bytes)
/// - Valid flag (1 byte)
/// - Reserved (1 byte)
/// - ECC/TB byte: bit 7 progressive, bits 0-2 frame rate (1 byte)
/// - Signal mode: 0x00 or 0x80 mean standard definition (1 byte)
/// - File record count as four ASCII digits, thousands first (4 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct IdxHeader {
    /// Identification bytes
    pub id: [u8; 8],

    /// Valid flag
    pub valid_flag: u8,

    /// Reserved byte
    pub reserved: u8,

    /// Progressive flag and frame-rate bits
    pub ecc_tb: u8,

    /// Signal mode
    pub signal_mode: u8,

    /// Record count as ASCII digits
    pub file_count_digits: [u8; 4],
}

impl IdxHeader {
    /// Parse a header from its exact wire bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        Self::read(&mut Cursor::new(&bytes[..])).map_err(IdxError::from)
    }

    /// Serialize the header to its wire bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Whether the clip was recorded progressive
    pub fn is_progressive(&self) -> bool {
        self.ecc_tb & PROGRESSIVE_FLAG != 0
    }

    /// Combined frame-rate code
    ///
    /// The low three bits of `ecc_tb`, plus 8 for interlaced clips.
    pub fn frame_rate_code(&self) -> u8 {
        let base = self.ecc_tb & FRAME_RATE_MASK;
        if self.is_progressive() {
            base
        } else {
            base + INTERLACED_RATE_OFFSET
        }
    }

    /// Frame rate described by this header, if it is one of the known codes
    pub fn frame_rate(&self) -> Option<FrameRate> {
        FrameRate::from_code(self.frame_rate_code())
    }

    /// Whether the signal mode marks a standard-definition clip
    pub fn is_standard_definition(&self) -> bool {
        matches!(self.signal_mode, 0x00 | 0x80)
    }

    /// Declared number of file-info records
    ///
    /// The declared count is only an upper bound for the record scan; it
    /// says nothing about how many records the stream actually holds.
    pub fn file_count(&self) -> Result<u16> {
        let mut count: u16 = 0;
        for &digit in &self.file_count_digits {
            if !digit.is_ascii_digit() {
                return Err(IdxError::CorruptIndex(format!(
                    "record count digit {digit:#04x} is not ASCII"
                )));
            }
            count = count * 10 + u16::from(digit - b'0');
        }
        Ok(count)
    }

    /// Encode a record count as four ASCII digits
    pub fn encode_file_count(count: usize) -> Result<[u8; 4]> {
        if count > 9999 {
            return Err(IdxError::TooManyRecords(count));
        }
        let text = format!("{count:04}");
        let mut digits = [0u8; 4];
        digits.copy_from_slice(text.as_bytes());
        Ok(digits)
    }
}
