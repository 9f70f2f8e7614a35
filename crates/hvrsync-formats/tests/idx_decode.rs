#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for index decoding from files and arbitrary streams

use hvrsync_formats::IndexDigest;
use hvrsync_formats::idx::{
    ClipName, FileInfoRecord, FrameRate, HEADER_SIZE, IdxDecoder, IdxError, IdxFileBuilder,
    RECORD_SIZE, Timecode,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const CLIP: &str = "00_0001_2007-08-06_165555";

fn clip() -> ClipName {
    ClipName::parse(CLIP).expect("clip name")
}

fn matching_record() -> FileInfoRecord {
    let mut record = FileInfoRecord::new(2007, 8, 6, 16, 55, 55).expect("record");
    record.start_timecode = Timecode {
        hours: 1,
        minutes: 2,
        seconds: 3,
        frames: 4,
        drop_frame: true,
    }
    .to_packed();
    record.total_frames = 0x0001_2345;
    record
}

#[test]
fn decode_file_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(format!("{CLIP}.IDX"));
    let data = IdxFileBuilder::new()
        .frame_rate(FrameRate::I59_94)
        .add_record(FileInfoRecord::new(2007, 8, 6, 10, 0, 0).expect("record"))
        .add_record(matching_record())
        .build()
        .expect("build");
    std::fs::write(&path, &data).expect("write");

    let decoded = IdxDecoder::decode_file(&path, &clip()).expect("decode");
    let meta = &decoded.metadata;

    assert_eq!(meta.frame_rate, Some(FrameRate::I59_94));
    assert!(!meta.progressive);
    assert_eq!(meta.total_frames, 74565);
    assert_eq!(meta.start_timecode.to_string(), "01;02;03;04");
    assert_eq!(
        meta.timecode_format().map(|f| f.as_str()),
        Some("2997DropTimecode")
    );
    assert_eq!(meta.creation_date.as_deref(), Some("2007-08-06T16:55:55Z"));
}

#[test]
fn digest_tracks_matched_record_only() {
    let other = FileInfoRecord::new(2007, 8, 6, 10, 0, 0).expect("record");
    let mut other_changed = other.clone();
    other_changed.total_frames = 99;

    let before = IdxFileBuilder::new()
        .add_record(other)
        .add_record(matching_record())
        .build()
        .expect("build");
    let after = IdxFileBuilder::new()
        .add_record(other_changed)
        .add_record(matching_record())
        .build()
        .expect("build");

    let a = IdxDecoder::decode_bytes(&before, &clip()).expect("decode");
    let b = IdxDecoder::decode_bytes(&after, &clip()).expect("decode");
    assert_eq!(IndexDigest::compute(&a.raw), IndexDigest::compute(&b.raw));

    let mut changed = matching_record();
    changed.total_frames += 1;
    let third = IdxFileBuilder::new().add_record(changed).build().expect("build");
    let c = IdxDecoder::decode_bytes(&third, &clip()).expect("decode");
    assert_ne!(IndexDigest::compute(&a.raw), IndexDigest::compute(&c.raw));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = IdxDecoder::decode_file(&dir.path().join("missing.IDX"), &clip()).unwrap_err();
    assert!(matches!(err, IdxError::Io(_)));
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = IdxDecoder::decode_bytes(&data, &clip());
    }

    #[test]
    fn truncated_streams_never_decode(cut in 0usize..(HEADER_SIZE + 3 * RECORD_SIZE)) {
        // The match sits in the last of three records, so any cut before the
        // end of the stream must fail instead of reading past it.
        let data = IdxFileBuilder::new()
            .declared_count(50)
            .add_record(FileInfoRecord::new(2007, 8, 6, 1, 0, 0).expect("record"))
            .add_record(FileInfoRecord::new(2007, 8, 6, 2, 0, 0).expect("record"))
            .add_record(matching_record())
            .build()
            .expect("build");

        let result = IdxDecoder::decode_bytes(&data[..cut], &clip());
        let is_truncated = matches!(result, Err(IdxError::TruncatedIndex { .. }));
        prop_assert!(is_truncated);
    }
}
