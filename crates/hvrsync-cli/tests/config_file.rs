#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Configuration file handling through the command line

use clap::Parser;
use hvrsync_cli::{Cli, commands};
use hvrsync_formats::idx::{FileInfoRecord, IdxFileBuilder};
use hvrsync_sidecar::UpdateMode;
use pretty_assertions::assert_eq;
use std::ffi::OsStr;
use std::fs;

const CLIP: &str = "00_0001_2007-08-06_165555";

#[test]
fn config_file_layout_is_used_by_sync() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clip_dir = dir.path().join("video").join("hvr");
    fs::create_dir_all(&clip_dir).expect("mkdir");
    let data = IdxFileBuilder::new()
        .add_record(FileInfoRecord::new(2007, 8, 6, 16, 55, 55).expect("record"))
        .build()
        .expect("build");
    fs::write(clip_dir.join(format!("{CLIP}.IDX")), data).expect("write");

    let config_path = dir.path().join("hvrsync.json");
    fs::write(
        &config_path,
        r#"{"video_dir": "video", "clip_dir": "hvr", "sidecar_extension": "json", "update_mode": "fast"}"#,
    )
    .expect("write config");

    let clip_path = dir.path().join(CLIP);
    let cli = Cli::try_parse_from([
        OsStr::new("hvrsync"),
        OsStr::new("--config"),
        config_path.as_os_str(),
        OsStr::new("sync"),
        clip_path.as_os_str(),
    ])
    .expect("parse");

    let config = cli.sync_config().expect("config");
    assert_eq!(config.update_mode, UpdateMode::Fast);

    let summary = commands::sync(&config, &clip_path, false).expect("sync");
    assert_eq!(summary.persisted, Some("create"));
    assert!(clip_dir.join(format!("{CLIP}.json")).is_file());
}

#[test]
fn missing_config_file_is_reported() {
    let cli = Cli::try_parse_from([
        "hvrsync",
        "--config",
        "/nonexistent/hvrsync.json",
        "digest",
        "/media/clip",
    ])
    .expect("parse");

    let err = cli.sync_config().unwrap_err();
    assert!(format!("{err:#}").contains("loading config"));
}
