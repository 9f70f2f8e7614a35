//! HDV clip index format (`.IDX`)
//!
//! The index file describes every segment recorded for a clip family:
//! a 16-byte header followed by 16-byte file-info records.
//!
//! # Format Overview
//!
//! ```text
//! Header (16B):  id[8] valid[1] reserved[1] eccTb[1] signalMode[1] countDigits[4]
//! Record (16B):  typeTag[2] year[1] month[1] day[1] hour[1] minute[1] second[1]
//!                startTimecode[4] totalFrameCount[4]
//! ```
//!
//! - The record count is four ASCII digits
//! - The total frame count is big-endian
//! - Years are stored as an offset from 2000
//!
//! # Usage
//!
//! ```rust
//! use hvrsync_formats::idx::{ClipName, FileInfoRecord, FrameRate, IdxDecoder, IdxFileBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = FileInfoRecord::new(2007, 8, 6, 16, 55, 55)?;
//! record.total_frames = 1800;
//!
//! let data = IdxFileBuilder::new()
//!     .frame_rate(FrameRate::P25)
//!     .add_record(record)
//!     .build()?;
//!
//! let clip = ClipName::parse("00_0001_2007-08-06_165555")?;
//! let decoded = IdxDecoder::decode_bytes(&data, &clip)?;
//! assert_eq!(decoded.metadata.total_frames, 1800);
//! assert_eq!(decoded.metadata.frame_rate, Some(FrameRate::P25));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod clip_name;
pub mod decoder;
pub mod error;
pub mod frame_rate;
pub mod header;
pub mod metadata;
pub mod record;
pub mod timecode;

// Re-export main types
pub use builder::IdxFileBuilder;
pub use clip_name::{CLIP_NAME_LEN, ClipName};
pub use decoder::{DecodedIndex, IdxDecoder, RawIndexBytes};
pub use error::{IdxError, Result};
pub use frame_rate::FrameRate;
pub use header::{HEADER_SIZE, IdxHeader};
pub use metadata::{FrameSize, HD_FRAME_SIZE, HD_PIXEL_ASPECT_RATIO, TechnicalMetadata};
pub use record::{DATE_PRESENT_TAG, FileInfoRecord, RECORD_SIZE};
pub use timecode::{Timecode, TimecodeFormat};
