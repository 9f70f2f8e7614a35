//! Command implementations.

use crate::cli::{Cli, Command};
use anyhow::{Context, Result};
use hvrsync_formats::{IdxDecoder, IndexDigest, TechnicalMetadata};
use hvrsync_sidecar::{
    ClipHandler, ClipIdentity, ClipLocator, GateDecision, OpenMode, PersistStrategy,
    ProcessOutcome, SyncConfig, TrackedProperty,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output of `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Clip token
    pub clip: String,
    /// Index file that was decoded
    pub index: PathBuf,
    /// Sidecar path for the clip
    pub sidecar: PathBuf,
    /// Position of the matched record in the index
    pub record_index: u16,
    /// Digest of the header and matched record
    pub digest: String,
    /// Decoded technical metadata
    pub metadata: TechnicalMetadata,
}

/// Output of `sync`
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    /// Clip token
    pub clip: String,
    /// What processing found
    pub outcome: &'static str,
    /// Properties written
    pub written: Vec<&'static str>,
    /// Properties kept because they were authored before the first sync
    pub protected: Vec<&'static str>,
    /// How the sidecar was written, if it was
    pub persisted: Option<&'static str>,
}

/// Run a parsed command line, printing results to stdout
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.sync_config()?;

    let output = match &cli.command {
        Command::Inspect { path } => serde_json::to_string_pretty(&inspect(&config, path)?)?,
        Command::Digest { path } => digest(&config, path)?
            .context("index has no record for this clip")?,
        Command::Sync {
            path, force_write, ..
        } => serde_json::to_string_pretty(&sync(&config, path, *force_write)?)?,
    };
    println!("{output}");
    Ok(())
}

fn resolve(config: &SyncConfig, path: &Path) -> Result<ClipIdentity> {
    ClipLocator::new(config)
        .resolve_clip(path)
        .with_context(|| format!("resolving clip {}", path.display()))
}

/// Decode a clip's index
pub fn inspect(config: &SyncConfig, path: &Path) -> Result<InspectReport> {
    let identity = resolve(config, path)?;
    let locator = ClipLocator::new(config);
    let index = locator.index_path_for(&identity)?;
    let sidecar = locator.sidecar_path_for(&identity);

    let decoded = IdxDecoder::decode_file(&index, &identity.clip)
        .with_context(|| format!("decoding {}", index.display()))?;

    Ok(InspectReport {
        clip: identity.clip.to_string(),
        index,
        sidecar,
        record_index: decoded.record_index,
        digest: IndexDigest::compute(&decoded.raw).to_hex(),
        metadata: decoded.metadata,
    })
}

/// Current index digest of a clip, `None` when no record matches
pub fn digest(config: &SyncConfig, path: &Path) -> Result<Option<String>> {
    let identity = resolve(config, path)?;
    let handler: ClipHandler = ClipHandler::open(identity, config.clone(), OpenMode::Read)?;
    Ok(handler.current_digest()?.map(|d| d.to_hex()))
}

/// Sync a clip's sidecar, writing it when metadata changed or when forced
pub fn sync(config: &SyncConfig, path: &Path, force_write: bool) -> Result<SyncSummary> {
    let identity = resolve(config, path)?;
    let clip = identity.clip.to_string();

    let mut handler: ClipHandler = ClipHandler::open(identity, config.clone(), OpenMode::Update)
        .with_context(|| format!("opening sidecar for {clip}"))?;
    let outcome = handler.process()?;

    if outcome.changed_metadata() || force_write {
        handler.mark_dirty();
    }
    let persisted = handler.close()?;

    let (label, written, protected) = match &outcome {
        ProcessOutcome::NoIndexData => ("no-index-data", Vec::new(), Vec::new()),
        ProcessOutcome::Unchanged => ("unchanged", Vec::new(), Vec::new()),
        ProcessOutcome::Reconciled { decision, report } => (
            match decision {
                GateDecision::FirstSync => "first-sync",
                GateDecision::Stale | GateDecision::Unchanged => "stale",
            },
            names(&report.written),
            names(&report.protected),
        ),
    };

    let persisted = persisted.map(|strategy| match strategy {
        PersistStrategy::Create => "create",
        PersistStrategy::Overwrite => "overwrite",
        PersistStrategy::SafeReplace => "safe-replace",
    });
    info!("Synced {} ({}), sidecar {:?}", clip, label, persisted);

    Ok(SyncSummary {
        clip,
        outcome: label,
        written,
        protected,
        persisted,
    })
}

fn names(properties: &[TrackedProperty]) -> Vec<&'static str> {
    properties.iter().map(|p| p.name()).collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use hvrsync_formats::idx::{FileInfoRecord, FrameRate, IdxFileBuilder};
    use pretty_assertions::assert_eq;
    use std::fs;

    const CLIP: &str = "00_0001_2007-08-06_165555";

    fn clip_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let hvr = dir.path().join("VIDEO").join("HVR");
        fs::create_dir_all(&hvr).expect("mkdir");

        let mut record = FileInfoRecord::new(2007, 8, 6, 16, 55, 55).expect("record");
        record.total_frames = 250;
        let data = IdxFileBuilder::new()
            .frame_rate(FrameRate::P25)
            .add_record(record)
            .build()
            .expect("build");
        fs::write(hvr.join(format!("{CLIP}.IDX")), data).expect("write");
        dir
    }

    #[test]
    fn test_inspect_reports_metadata() {
        let dir = clip_folder();
        let report = inspect(&SyncConfig::default(), &dir.path().join(CLIP)).expect("inspect");

        assert_eq!(report.clip, CLIP);
        assert_eq!(report.record_index, 0);
        assert_eq!(report.metadata.frame_rate, Some(FrameRate::P25));
        assert_eq!(report.metadata.total_frames, 250);
        assert_eq!(report.digest.len(), 32);

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["metadata"]["creation_date"], "2007-08-06T16:55:55Z");
    }

    #[test]
    fn test_inspect_ignores_sidecar() {
        let dir = clip_folder();
        let sidecar = dir.path().join("VIDEO").join("HVR").join(format!("{CLIP}.XMP"));
        fs::write(&sidecar, b"<not json/>").expect("write");

        let config = SyncConfig::default().with_max_sidecar_size(4);
        let report = inspect(&config, &dir.path().join(CLIP)).expect("inspect");
        assert_eq!(report.sidecar, sidecar);
        assert_eq!(report.metadata.total_frames, 250);
    }

    #[test]
    fn test_digest_matches_inspect() {
        let dir = clip_folder();
        let config = SyncConfig::default();
        let path = dir.path().join(CLIP);

        let digest = digest(&config, &path).expect("digest");
        assert_eq!(digest, Some(inspect(&config, &path).expect("inspect").digest));
    }

    #[test]
    fn test_sync_then_resync() {
        let dir = clip_folder();
        let config = SyncConfig::default();
        let path = dir.path().join(CLIP);

        let first = sync(&config, &path, false).expect("sync");
        assert_eq!(first.outcome, "first-sync");
        assert_eq!(first.persisted, Some("create"));
        assert!(first.written.contains(&"videoFrameRate"));

        let second = sync(&config, &path, false).expect("sync");
        assert_eq!(second.outcome, "unchanged");
        assert_eq!(second.persisted, None);

        let forced = sync(&config, &path, true).expect("sync");
        assert_eq!(forced.persisted, Some("safe-replace"));
    }

    #[test]
    fn test_unknown_clip_is_an_error() {
        let dir = clip_folder();
        assert!(inspect(&SyncConfig::default(), &dir.path().join("01_0002")).is_err());
    }
}
