//! Binary formats for Sony HDV clip folders
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::doc_markdown)] // Format-specific terms don't need backticks
//! An HDV clip folder keeps one `.IDX` index file per clip family next to
//! the `.M2T` transport streams. The index is the authoritative source for
//! the clip's technical facts: frame size, frame rate, start timecode,
//! duration and recording time.
//!
//! # Modules
//!
//! - **idx**: index header and file-info record parsing, the frame-rate
//!   table, packed timecodes, derived technical metadata and a builder
//! - **digest**: the content digest used to detect when synced metadata
//!   has gone stale

#![warn(missing_docs)]

pub mod digest;
pub mod idx;

pub use digest::IndexDigest;
pub use idx::{ClipName, DecodedIndex, IdxDecoder, IdxError, TechnicalMetadata};
