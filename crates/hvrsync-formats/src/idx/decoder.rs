//! Index decoding
//!
//! Decoding reads the header, then scans file-info records until one
//! carries the requested clip's date/time stamp. Every block is read in
//! full or not at all: the declared record count is never taken as proof
//! that the stream actually holds that many records.

use crate::idx::clip_name::ClipName;
use crate::idx::error::{IdxError, Result};
use crate::idx::header::{HEADER_SIZE, IdxHeader};
use crate::idx::metadata::TechnicalMetadata;
use crate::idx::record::{FileInfoRecord, RECORD_SIZE};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Exact wire bytes of the header and the matched record
///
/// These are the bytes the index digest is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIndexBytes {
    /// Header block
    pub header: [u8; HEADER_SIZE],
    /// Matched file-info record
    pub record: [u8; RECORD_SIZE],
}

impl RawIndexBytes {
    /// Header followed by record, as one buffer
    pub fn to_vec(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + RECORD_SIZE);
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(&self.record);
        bytes
    }
}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIndex {
    /// Bytes for digesting
    pub raw: RawIndexBytes,
    /// Parsed header
    pub header: IdxHeader,
    /// Parsed matched record
    pub record: FileInfoRecord,
    /// Zero-based position of the matched record
    pub record_index: u16,
    /// Derived technical metadata
    pub metadata: TechnicalMetadata,
}

/// Index file decoder
pub struct IdxDecoder;

impl IdxDecoder {
    /// Decode the record for `clip` from an index stream
    ///
    /// Only fully-qualified clip names can match a record; short names
    /// fail with [`IdxError::RecordNotFound`] without reading anything.
    pub fn decode<R: Read>(reader: &mut R, clip: &ClipName) -> Result<DecodedIndex> {
        let Some(stamp) = clip.date_time_suffix() else {
            return Err(IdxError::RecordNotFound {
                clip: clip.to_string(),
                scanned: 0,
            });
        };

        let header_bytes: [u8; HEADER_SIZE] = read_block(reader, 0)?;
        let header = IdxHeader::parse(&header_bytes)?;
        let declared = header.file_count()?;

        let mut offset = HEADER_SIZE as u64;
        for index in 0..declared {
            let record_bytes: [u8; RECORD_SIZE] = read_block(reader, offset)?;
            let record = FileInfoRecord::parse(&record_bytes)?;

            if record.file_name_stamp() == stamp {
                let metadata = TechnicalMetadata::from_parts(&header, &record);
                return Ok(DecodedIndex {
                    raw: RawIndexBytes {
                        header: header_bytes,
                        record: record_bytes,
                    },
                    header,
                    record,
                    record_index: index,
                    metadata,
                });
            }

            offset += RECORD_SIZE as u64;
        }

        Err(IdxError::RecordNotFound {
            clip: clip.to_string(),
            scanned: declared,
        })
    }

    /// Decode from a byte slice
    pub fn decode_bytes(data: &[u8], clip: &ClipName) -> Result<DecodedIndex> {
        Self::decode(&mut &data[..], clip)
    }

    /// Open, decode and close an index file
    pub fn decode_file(path: &Path, clip: &ClipName) -> Result<DecodedIndex> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::decode(&mut reader, clip)
    }
}

/// Read exactly one fixed-size block, reporting how much was available on
/// a short read
fn read_block<R: Read, const N: usize>(reader: &mut R, offset: u64) -> Result<[u8; N]> {
    let mut block = [0u8; N];
    let mut filled = 0;
    while filled < N {
        match reader.read(&mut block[filled..]) {
            Ok(0) => {
                return Err(IdxError::TruncatedIndex {
                    offset,
                    expected: N,
                    actual: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(block)
}
