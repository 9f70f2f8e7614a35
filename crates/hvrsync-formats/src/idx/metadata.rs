//! Technical metadata derived from a header and its matched record

use crate::idx::frame_rate::FrameRate;
use crate::idx::header::IdxHeader;
use crate::idx::record::FileInfoRecord;
use crate::idx::timecode::{Timecode, TimecodeFormat};
use serde::Serialize;

/// Frame size of an HD clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Unit of width and height
    pub unit: &'static str,
}

/// HDV frame size (anamorphic 1440x1080)
pub const HD_FRAME_SIZE: FrameSize = FrameSize {
    width: 1440,
    height: 1080,
    unit: "pixels",
};

/// HDV pixel aspect ratio
pub const HD_PIXEL_ASPECT_RATIO: &str = "4/3";

/// Technical facts about one recorded segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalMetadata {
    /// Standard-definition signal
    pub standard_definition: bool,
    /// Progressive scan
    pub progressive: bool,
    /// Frame size, HD only
    pub frame_size: Option<FrameSize>,
    /// Pixel aspect ratio, HD only
    pub pixel_aspect_ratio: Option<&'static str>,
    /// Frame rate, if the header carries a known code
    pub frame_rate: Option<FrameRate>,
    /// Total frame count of the segment
    pub total_frames: u32,
    /// Start timecode
    pub start_timecode: Timecode,
    /// Creation timestamp, only when the camera recorded a date
    pub creation_date: Option<String>,
}

impl TechnicalMetadata {
    /// Derive metadata from a header and the record that matched the clip
    pub fn from_parts(header: &IdxHeader, record: &FileInfoRecord) -> Self {
        let standard_definition = header.is_standard_definition();
        let frame_rate = header.frame_rate();
        let drop_frame_eligible = frame_rate.is_some_and(FrameRate::supports_drop_frame);

        Self {
            standard_definition,
            progressive: header.is_progressive(),
            frame_size: (!standard_definition).then_some(HD_FRAME_SIZE),
            pixel_aspect_ratio: (!standard_definition).then_some(HD_PIXEL_ASPECT_RATIO),
            frame_rate,
            total_frames: record.total_frames,
            start_timecode: Timecode::from_packed(record.start_timecode, drop_frame_eligible),
            creation_date: record.creation_date(),
        }
    }

    /// Timecode format label, if the clip has a frame rate
    pub fn timecode_format(&self) -> Option<TimecodeFormat> {
        self.frame_rate
            .map(|rate| rate.timecode_format(self.start_timecode.drop_frame))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn header(ecc_tb: u8, signal_mode: u8) -> IdxHeader {
        IdxHeader {
            id: [0; 8],
            valid_flag: 1,
            reserved: 0,
            ecc_tb,
            signal_mode,
            file_count_digits: *b"0001",
        }
    }

    fn record() -> FileInfoRecord {
        let mut record = FileInfoRecord::new(2007, 8, 6, 16, 55, 55).expect("record");
        record.start_timecode = [0x44, 0x03, 0x02, 0x01];
        record.total_frames = 1800;
        record
    }

    #[test]
    fn test_hd_clip() {
        let meta = TechnicalMetadata::from_parts(&header(0x84, 0x01), &record());
        assert_eq!(meta.frame_size, Some(HD_FRAME_SIZE));
        assert_eq!(meta.pixel_aspect_ratio, Some("4/3"));
        assert_eq!(meta.frame_rate, Some(FrameRate::P29_97));
        assert_eq!(meta.start_timecode.to_string(), "01;02;03;04");
        assert_eq!(meta.timecode_format(), Some(TimecodeFormat::Drop2997));
        assert_eq!(meta.creation_date.as_deref(), Some("2007-08-06T16:55:55Z"));
        assert_eq!(meta.total_frames, 1800);
    }

    #[test]
    fn test_sd_clip_has_no_frame_size() {
        let meta = TechnicalMetadata::from_parts(&header(0x84, 0x80), &record());
        assert!(meta.standard_definition);
        assert_eq!(meta.frame_size, None);
        assert_eq!(meta.pixel_aspect_ratio, None);
    }

    #[test]
    fn test_drop_bit_ignored_at_25p() {
        let meta = TechnicalMetadata::from_parts(&header(0x83, 0x01), &record());
        assert!(!meta.start_timecode.drop_frame);
        assert_eq!(meta.timecode_format(), Some(TimecodeFormat::Timecode25));
    }

    #[test]
    fn test_rate_code_zero() {
        let meta = TechnicalMetadata::from_parts(&header(0x80, 0x01), &record());
        assert_eq!(meta.frame_rate, None);
        assert_eq!(meta.timecode_format(), None);
    }
}
