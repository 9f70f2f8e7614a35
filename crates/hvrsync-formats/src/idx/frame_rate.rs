//! Frame-rate codes
//!
//! | Code | Scale | Size | Label    |
//! |------|-------|------|----------|
//! | 1    | 24000 | 1001 | `23.98p` |
//! | 3    | 25    | 1    | `25p`    |
//! | 4    | 30000 | 1001 | `29.97p` |
//! | 11   | 25    | 1    | `50i`    |
//! | 12   | 30000 | 1001 | `59.94i` |
//!
//! Every other code, including 0 which cameras do write, means "no frame
//! rate" and suppresses all rate-dependent metadata.

use crate::idx::timecode::TimecodeFormat;
use serde::Serialize;
use std::fmt;

/// Frame rate decoded from the header's combined frame-rate code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameRate {
    /// 23.976 progressive
    P23_98,
    /// 25 progressive
    P25,
    /// 29.97 progressive
    P29_97,
    /// 50 fields interlaced
    I50,
    /// 59.94 fields interlaced
    I59_94,
}

impl FrameRate {
    /// All known frame rates
    pub const ALL: [Self; 5] = [Self::P23_98, Self::P25, Self::P29_97, Self::I50, Self::I59_94];

    /// Look up a combined frame-rate code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::P23_98),
            3 => Some(Self::P25),
            4 => Some(Self::P29_97),
            11 => Some(Self::I50),
            12 => Some(Self::I59_94),
            _ => None,
        }
    }

    /// Combined frame-rate code
    pub fn code(self) -> u8 {
        match self {
            Self::P23_98 => 1,
            Self::P25 => 3,
            Self::P29_97 => 4,
            Self::I50 => 11,
            Self::I59_94 => 12,
        }
    }

    /// Time scale (ticks per second)
    pub fn sample_scale(self) -> u32 {
        match self {
            Self::P23_98 => 24000,
            Self::P25 | Self::I50 => 25,
            Self::P29_97 | Self::I59_94 => 30000,
        }
    }

    /// Ticks per frame
    pub fn sample_size(self) -> u32 {
        match self {
            Self::P23_98 | Self::P29_97 | Self::I59_94 => 1001,
            Self::P25 | Self::I50 => 1,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::P23_98 => "23.98p",
            Self::P25 => "25p",
            Self::P29_97 => "29.97p",
            Self::I50 => "50i",
            Self::I59_94 => "59.94i",
        }
    }

    /// Whether the drop-frame bit of a timecode is honored at this rate
    pub fn supports_drop_frame(self) -> bool {
        matches!(self, Self::P29_97 | Self::I59_94)
    }

    /// Duration scale as `<size>/<scale>`, e.g. `1001/30000`
    pub fn duration_scale(self) -> String {
        format!("{}/{}", self.sample_size(), self.sample_scale())
    }

    /// Timecode format label for timecodes at this rate
    pub fn timecode_format(self, drop_frame: bool) -> TimecodeFormat {
        match self {
            Self::P25 | Self::I50 => TimecodeFormat::Timecode25,
            Self::P23_98 if drop_frame => TimecodeFormat::Drop23976,
            Self::P23_98 => TimecodeFormat::NonDrop23976,
            Self::P29_97 | Self::I59_94 if drop_frame => TimecodeFormat::Drop2997,
            Self::P29_97 | Self::I59_94 => TimecodeFormat::NonDrop2997,
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
