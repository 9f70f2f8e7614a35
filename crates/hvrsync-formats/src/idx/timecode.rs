//! Packed start timecodes
//!
//! The four timecode bytes hold frames, seconds, minutes and hours in that
//! order. Each byte carries two decimal digits: units in the low nibble and
//! tens in the masked bits of the high nibble. Bit 0x40 of the frames byte
//! is the drop-frame flag.

use serde::Serialize;
use std::fmt;

/// Drop-frame flag in the frames byte
const DROP_FRAME_FLAG: u8 = 0x40;

/// Tens mask for the frames and hours bytes
const TENS_MASK_2BIT: u8 = 0x30;

/// Tens mask for the seconds and minutes bytes
const TENS_MASK_3BIT: u8 = 0x70;

fn unpack_digits(byte: u8, tens_mask: u8) -> u8 {
    ((byte & tens_mask) >> 4) * 10 + (byte & 0x0F)
}

fn pack_digits(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Start timecode of a recorded segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Timecode {
    /// Hours
    pub hours: u8,
    /// Minutes
    pub minutes: u8,
    /// Seconds
    pub seconds: u8,
    /// Frames
    pub frames: u8,
    /// Drop-frame counting
    pub drop_frame: bool,
}

impl Timecode {
    /// Decode packed timecode bytes
    ///
    /// `drop_frame_eligible` is false for rates where the drop-frame bit
    /// has no meaning; the bit is ignored for those.
    pub fn from_packed(bytes: [u8; 4], drop_frame_eligible: bool) -> Self {
        Self {
            frames: unpack_digits(bytes[0], TENS_MASK_2BIT),
            seconds: unpack_digits(bytes[1], TENS_MASK_3BIT),
            minutes: unpack_digits(bytes[2], TENS_MASK_3BIT),
            hours: unpack_digits(bytes[3], TENS_MASK_2BIT),
            drop_frame: drop_frame_eligible && bytes[0] & DROP_FRAME_FLAG != 0,
        }
    }

    /// Encode to packed timecode bytes
    ///
    /// Fields are expected to be within their two-digit ranges.
    pub fn to_packed(&self) -> [u8; 4] {
        let mut frames = pack_digits(self.frames) & (TENS_MASK_2BIT | 0x0F);
        if self.drop_frame {
            frames |= DROP_FRAME_FLAG;
        }
        [
            frames,
            pack_digits(self.seconds) & (TENS_MASK_3BIT | 0x0F),
            pack_digits(self.minutes) & (TENS_MASK_3BIT | 0x0F),
            pack_digits(self.hours) & (TENS_MASK_2BIT | 0x0F),
        ]
    }

    /// Field separator: `;` for drop-frame, `:` otherwise
    pub fn separator(&self) -> char {
        if self.drop_frame { ';' } else { ':' }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.separator();
        write!(
            f,
            "{:02}{sep}{:02}{sep}{:02}{sep}{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Timecode format label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimecodeFormat {
    /// `24Timecode`
    Timecode24,
    /// `25Timecode`
    Timecode25,
    /// `50Timecode`
    Timecode50,
    /// `23976DropTimecode`
    Drop23976,
    /// `23976NonDropTimecode`
    NonDrop23976,
    /// `2997DropTimecode`
    Drop2997,
    /// `2997NonDropTimecode`
    NonDrop2997,
    /// `5994DropTimecode`
    Drop5994,
    /// `5994NonDropTimecode`
    NonDrop5994,
}

impl TimecodeFormat {
    /// Label for a sample scale/size pair
    ///
    /// Integral rates (size 1) map on scale 24, 25 or 50; fractional rates
    /// (size 1001) on scale 24000, 30000 or 60000. Anything else has no
    /// label.
    pub fn from_sample_rate(scale: u32, size: u32, drop_frame: bool) -> Option<Self> {
        match (size, scale) {
            (1, 24) => Some(Self::Timecode24),
            (1, 25) => Some(Self::Timecode25),
            (1, 50) => Some(Self::Timecode50),
            (1001, 24000) if drop_frame => Some(Self::Drop23976),
            (1001, 24000) => Some(Self::NonDrop23976),
            (1001, 30000) if drop_frame => Some(Self::Drop2997),
            (1001, 30000) => Some(Self::NonDrop2997),
            (1001, 60000) if drop_frame => Some(Self::Drop5994),
            (1001, 60000) => Some(Self::NonDrop5994),
            _ => None,
        }
    }

    /// Label string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timecode24 => "24Timecode",
            Self::Timecode25 => "25Timecode",
            Self::Timecode50 => "50Timecode",
            Self::Drop23976 => "23976DropTimecode",
            Self::NonDrop23976 => "23976NonDropTimecode",
            Self::Drop2997 => "2997DropTimecode",
            Self::NonDrop2997 => "2997NonDropTimecode",
            Self::Drop5994 => "5994DropTimecode",
            Self::NonDrop5994 => "5994NonDropTimecode",
        }
    }
}

impl fmt::Display for TimecodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idx::frame_rate::FrameRate;

    #[test]
    fn test_drop_frame_timecode() {
        // 01:02:03:04 with the drop bit set, at 29.97p
        let rate = FrameRate::P29_97;
        let tc = Timecode::from_packed([0x44, 0x03, 0x02, 0x01], rate.supports_drop_frame());
        assert_eq!(tc.to_string(), "01;02;03;04");
        assert_eq!(rate.timecode_format(tc.drop_frame).as_str(), "2997DropTimecode");
    }

    #[test]
    fn test_drop_bit_ignored_when_not_eligible() {
        let tc = Timecode::from_packed([0x44, 0x03, 0x02, 0x01], false);
        assert!(!tc.drop_frame);
        assert_eq!(tc.to_string(), "01:02:03:04");
    }

    #[test]
    fn test_tens_digits() {
        // frames 29, seconds 59, minutes 47, hours 23
        let tc = Timecode::from_packed([0x29, 0x59, 0x47, 0x23], false);
        assert_eq!(
            (tc.hours, tc.minutes, tc.seconds, tc.frames),
            (23, 47, 59, 29)
        );
    }

    #[test]
    fn test_masks_discard_flag_bits() {
        // High bits outside the tens masks must not leak into the values
        let tc = Timecode::from_packed([0x80 | 0x12, 0x80 | 0x34, 0x80 | 0x56, 0xC0 | 0x12], false);
        assert_eq!(
            (tc.hours, tc.minutes, tc.seconds, tc.frames),
            (12, 56, 34, 12)
        );
    }

    #[test]
    fn test_pack_inverts_unpack() {
        let tc = Timecode {
            hours: 10,
            minutes: 59,
            seconds: 30,
            frames: 24,
            drop_frame: true,
        };
        assert_eq!(Timecode::from_packed(tc.to_packed(), true), tc);
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(
            TimecodeFormat::from_sample_rate(24, 1, false).map(TimecodeFormat::as_str),
            Some("24Timecode")
        );
        assert_eq!(
            TimecodeFormat::from_sample_rate(60000, 1001, false).map(TimecodeFormat::as_str),
            Some("5994NonDropTimecode")
        );
        assert_eq!(
            TimecodeFormat::from_sample_rate(24000, 1001, true).map(TimecodeFormat::as_str),
            Some("23976DropTimecode")
        );
        assert_eq!(TimecodeFormat::from_sample_rate(30, 1, false), None);
        assert_eq!(TimecodeFormat::from_sample_rate(25, 1001, false), None);
    }
}
