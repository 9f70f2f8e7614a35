//! Per-clip sync session
//!
//! A [`ClipHandler`] owns one resolved clip for its whole lifetime:
//!
//! 1. [`open`](ClipHandler::open) reads the existing sidecar, if any, into
//!    the metadata container. In [`OpenMode::Update`] the file handle is
//!    kept for the later write.
//! 2. [`process`](ClipHandler::process) decodes the index, gates on the
//!    stored digest and reconciles. It runs at most once per handler.
//! 3. [`update`](ClipHandler::update) stores the fresh digest and persists
//!    the container when the handler was marked dirty.

use crate::config::{SyncConfig, UpdateMode};
use crate::container::{MetadataContainer, PropertyStore};
use crate::gate::{self, GateDecision};
use crate::locator::{ClipIdentity, ClipLocator};
use crate::reconcile::{ReconcileReport, reconcile};
use crate::update::{PersistStrategy, SidecarFs, StdFs, UpdateCoordinator};
use crate::{Result, SidecarError};
use hvrsync_formats::{DecodedIndex, IdxDecoder, IndexDigest};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the sidecar is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read the sidecar and close it immediately
    Read,
    /// Keep the sidecar open so it can be rewritten
    Update,
}

/// Result of [`ClipHandler::process`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The index has no record for this clip; metadata was left alone
    NoIndexData,
    /// The stored digest matches the index
    Unchanged,
    /// The index was applied to the container
    Reconciled {
        /// Gate decision that led here
        decision: GateDecision,
        /// Properties written or protected
        report: ReconcileReport,
    },
}

impl ProcessOutcome {
    /// Whether the container was modified
    pub fn changed_metadata(&self) -> bool {
        matches!(self, Self::Reconciled { report, .. } if report.changed())
    }
}

/// One open/process/update session for a clip
#[derive(Debug)]
pub struct ClipHandler<C = PropertyStore, F = StdFs> {
    identity: ClipIdentity,
    config: SyncConfig,
    locator: ClipLocator,
    mode: OpenMode,
    sidecar_path: PathBuf,
    sidecar_file: Option<File>,
    container: C,
    outcome: Option<ProcessOutcome>,
    dirty: bool,
    coordinator: UpdateCoordinator<F>,
}

impl<C: MetadataContainer> ClipHandler<C, StdFs> {
    /// Open a session on the real file system
    pub fn open(identity: ClipIdentity, config: SyncConfig, mode: OpenMode) -> Result<Self> {
        Self::open_with_fs(identity, config, mode, StdFs)
    }
}

impl<C: MetadataContainer, F: SidecarFs> ClipHandler<C, F> {
    /// Open a session with custom persistence file operations
    ///
    /// Fails with [`SidecarError::OversizedSidecar`] when an existing
    /// sidecar is larger than the configured limit.
    pub fn open_with_fs(
        identity: ClipIdentity,
        config: SyncConfig,
        mode: OpenMode,
        fs: F,
    ) -> Result<Self> {
        config.validate()?;
        let locator = ClipLocator::new(&config);
        let sidecar_path = locator.sidecar_path_for(&identity);

        let (container, sidecar_file) =
            read_sidecar::<C>(&sidecar_path, mode, config.max_sidecar_size)?;

        debug!("Opened clip {} for {:?}", identity.clip, mode);

        Ok(Self {
            identity,
            config,
            locator,
            mode,
            sidecar_path,
            sidecar_file,
            container,
            outcome: None,
            dirty: false,
            coordinator: UpdateCoordinator::with_fs(fs),
        })
    }

    /// Resolved clip
    pub fn identity(&self) -> &ClipIdentity {
        &self.identity
    }

    /// Sidecar path for this clip
    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    /// Open mode
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Metadata container
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable metadata container
    ///
    /// Changes are only persisted once the handler is marked dirty.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Request that [`update`](Self::update) writes the sidecar
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether an update is pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Decode the index for this clip
    ///
    /// Read fresh on every call.
    pub fn decode_index(&self) -> Result<DecodedIndex> {
        let path = self.locator.index_path_for(&self.identity)?;
        debug!("Decoding {}", path.display());
        Ok(IdxDecoder::decode_file(&path, &self.identity.clip)?)
    }

    /// Digest of the index bytes currently backing this clip
    ///
    /// `None` when the index has no record for the clip.
    pub fn current_digest(&self) -> Result<Option<IndexDigest>> {
        match self.decode_index() {
            Ok(decoded) => Ok(Some(IndexDigest::compute(&decoded.raw))),
            Err(e) if e.is_not_applicable() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bring the container in line with the index
    ///
    /// Only the first call does any work; later calls return the same
    /// outcome.
    pub fn process(&mut self) -> Result<ProcessOutcome> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }
        let outcome = self.sync_from_index()?;
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    fn sync_from_index(&mut self) -> Result<ProcessOutcome> {
        let decoded = match self.decode_index() {
            Ok(decoded) => decoded,
            Err(e) if e.is_not_applicable() => {
                info!("No index data for clip {}: {}", self.identity.clip, e);
                return Ok(ProcessOutcome::NoIndexData);
            }
            Err(e) => return Err(e),
        };

        let current = IndexDigest::compute(&decoded.raw);
        let decision = gate::classify(gate::stored_digest(&self.container), Some(&current));
        debug!(
            "Clip {} record {} digest {} -> {:?}",
            self.identity.clip, decoded.record_index, current, decision
        );

        if !decision.needs_reconcile() {
            return Ok(ProcessOutcome::Unchanged);
        }

        let report = reconcile(
            &mut self.container,
            &decoded.metadata,
            decision.prior_digest_present(),
        )?;
        info!(
            "Clip {}: {:?}, {} written, {} protected",
            self.identity.clip,
            decision,
            report.written.len(),
            report.protected.len()
        );
        Ok(ProcessOutcome::Reconciled { decision, report })
    }

    /// Persist the container if the handler is dirty
    ///
    /// The stored digest is recomputed first so the next open gates on
    /// what was actually written. Returns `None` when nothing was pending.
    pub fn update(&mut self, mode: UpdateMode) -> Result<Option<PersistStrategy>> {
        if self.mode == OpenMode::Read {
            return Err(SidecarError::ReadOnly(self.identity.clip.to_string()));
        }
        if !self.dirty {
            return Ok(None);
        }

        let digest = match self.decode_index() {
            Ok(decoded) => Some(IndexDigest::compute(&decoded.raw)),
            Err(e) => {
                warn!(
                    "Cannot digest index for clip {}, removing stored digest: {}",
                    self.identity.clip, e
                );
                None
            }
        };
        gate::store_digest(&mut self.container, digest.as_ref())?;

        let data = self.container.to_bytes()?;
        let strategy = self.coordinator.persist(
            &self.sidecar_path,
            self.sidecar_file.take(),
            mode,
            &data,
        )?;
        self.dirty = false;

        info!(
            "Wrote sidecar {} ({:?}, {} bytes)",
            self.sidecar_path.display(),
            strategy,
            data.len()
        );
        Ok(Some(strategy))
    }

    /// End the session, writing any pending update with the configured mode
    pub fn close(mut self) -> Result<Option<PersistStrategy>> {
        if self.mode == OpenMode::Update && self.dirty {
            let mode = self.config.update_mode;
            return self.update(mode);
        }
        Ok(None)
    }
}

/// Read an existing sidecar into a container
///
/// Returns the handle only in update mode.
fn read_sidecar<C: MetadataContainer>(
    path: &Path,
    mode: OpenMode,
    limit: u64,
) -> Result<(C, Option<File>)> {
    let opened = match mode {
        OpenMode::Read => File::open(path),
        OpenMode::Update => OpenOptions::new().read(true).write(true).open(path),
    };
    let mut file = match opened {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No sidecar at {}", path.display());
            return Ok((C::default(), None));
        }
        Err(e) => return Err(e.into()),
    };

    let size = file.metadata()?.len();
    if size > limit {
        return Err(SidecarError::OversizedSidecar {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let container = C::from_bytes(&bytes)?;
    debug!("Read sidecar {} ({} bytes)", path.display(), size);

    match mode {
        OpenMode::Read => Ok((container, None)),
        OpenMode::Update => Ok((container, Some(file))),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use hvrsync_formats::ClipName;
    use std::fs;

    fn identity(root: &Path) -> ClipIdentity {
        ClipIdentity {
            root: root.to_path_buf(),
            clip: ClipName::parse("00_0001_2007-08-06_165555").expect("clip"),
        }
    }

    fn hvr(root: &Path) -> PathBuf {
        let dir = root.join("VIDEO").join("HVR");
        fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn test_oversized_sidecar_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(hvr(dir.path()).join("00_0001_2007-08-06_165555.XMP"), [b' '; 64])
            .expect("write");

        let config = SyncConfig::default().with_max_sidecar_size(16);
        let err = ClipHandler::<PropertyStore>::open(identity(dir.path()), config, OpenMode::Read)
            .unwrap_err();
        assert!(matches!(
            err,
            SidecarError::OversizedSidecar {
                size: 64,
                limit: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_handle_kept_only_in_update_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(hvr(dir.path()).join("00_0001_2007-08-06_165555.XMP"), b"{}").expect("write");

        let handler: ClipHandler = ClipHandler::open(
            identity(dir.path()),
            SyncConfig::default(),
            OpenMode::Read,
        )
        .expect("open");
        assert!(handler.sidecar_file.is_none());

        let handler: ClipHandler = ClipHandler::open(
            identity(dir.path()),
            SyncConfig::default(),
            OpenMode::Update,
        )
        .expect("open");
        assert!(handler.sidecar_file.is_some());
    }

    #[test]
    fn test_missing_index_is_no_index_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        hvr(dir.path());

        let mut handler: ClipHandler =
            ClipHandler::open(identity(dir.path()), SyncConfig::default(), OpenMode::Update)
                .expect("open");
        assert_eq!(handler.process().expect("process"), ProcessOutcome::NoIndexData);
        assert!(!handler.process().expect("again").changed_metadata());
        assert_eq!(handler.current_digest().expect("digest"), None);
    }

    #[test]
    fn test_update_in_read_mode_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        hvr(dir.path());

        let mut handler: ClipHandler =
            ClipHandler::open(identity(dir.path()), SyncConfig::default(), OpenMode::Read)
                .expect("open");
        handler.mark_dirty();
        assert!(matches!(
            handler.update(UpdateMode::Safe),
            Err(SidecarError::ReadOnly(_))
        ));
        assert_eq!(handler.close().expect("close"), None);
    }

    #[test]
    fn test_clean_handler_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let hvr = hvr(dir.path());

        let handler: ClipHandler =
            ClipHandler::open(identity(dir.path()), SyncConfig::default(), OpenMode::Update)
                .expect("open");
        assert_eq!(handler.close().expect("close"), None);
        assert!(!hvr.join("00_0001_2007-08-06_165555.XMP").exists());
    }
}
