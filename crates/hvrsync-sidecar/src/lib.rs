//! Metadata sidecar synchronization for Sony HDV clip folders.
//!
//! An HDV clip folder has the camera's binary `.IDX` index next to the
//! recorded streams. This crate keeps a per-clip metadata sidecar in step
//! with the technical facts in that index without silently discarding
//! metadata a user wrote by hand:
//!
//! - **Locator**: resolves a clip path or token to its index file
//! - **Gate**: compares the stored index digest with the current one
//! - **Reconciler**: writes technical properties under the staleness policy
//! - **Update coordinator**: persists the sidecar (create, overwrite in
//!   place, or safe replace)
//! - **Clip handler**: one open/process/update/close session per clip
//!
//! # Folder Layout
//!
//! ```text
//! .../MyMovie/
//!     VIDEO/
//!         HVR/
//!             00_0001_2007-08-06_165555.IDX
//!             00_0001_2007-08-06_165555.M2T
//!             00_0001_2007-08-06_165555.XMP   <- sidecar
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hvrsync_sidecar::{ClipHandler, ClipLocator, OpenMode, PropertyStore, SyncConfig};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::default();
//! let locator = ClipLocator::new(&config);
//! let identity = locator.resolve_clip(Path::new("/media/MyMovie/00_0001_2007-08-06_165555"))?;
//!
//! let mut handler: ClipHandler<PropertyStore> =
//!     ClipHandler::open(identity, config, OpenMode::Update)?;
//! if handler.process()?.changed_metadata() {
//!     handler.mark_dirty();
//! }
//! handler.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use hvrsync_formats::IdxError;
use std::path::PathBuf;
use thiserror::Error;

// Configuration
pub mod config;

// Clip and index file discovery
pub mod locator;

// Metadata container abstraction and default store
pub mod container;

// Digest gating
pub mod gate;

// Staleness policy
pub mod reconcile;

// Sidecar persistence
pub mod update;

// Per-clip session
pub mod handler;

pub use config::{SyncConfig, UpdateMode};
pub use container::{MetadataContainer, PropertyStore, PropertyValue};
pub use gate::{GateDecision, classify};
pub use handler::{ClipHandler, OpenMode, ProcessOutcome};
pub use locator::{ClipIdentity, ClipLocator};
pub use reconcile::{ReconcileReport, TrackedProperty, reconcile};
pub use update::{PersistStrategy, SidecarFs, StdFs, UpdateCoordinator};

/// Result type for sidecar operations.
pub type Result<T> = std::result::Result<T, SidecarError>;

/// Errors that can occur while locating, syncing or persisting a sidecar.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path is not inside an HDV clip folder.
    #[error("Not an HDV clip path: {0}")]
    NotAClipPath(PathBuf),

    /// No index file matches the clip.
    #[error("No index file for clip '{clip}' in {dir}")]
    ClipNotFound {
        /// Clip token that was searched for
        clip: String,
        /// Folder that was scanned
        dir: PathBuf,
    },

    /// Index decoding failed.
    #[error("Index error: {0}")]
    Index(#[from] IdxError),

    /// Existing sidecar exceeds the configured size limit.
    #[error("Sidecar {path} is {size} bytes, limit is {limit}")]
    OversizedSidecar {
        /// Sidecar path
        path: PathBuf,
        /// Measured size
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// Metadata container error.
    #[error("Container error: {0}")]
    Container(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Update requested on a handler opened for reading.
    #[error("Handler for '{0}' was opened read-only")]
    ReadOnly(String),

    /// Sidecar could not be created.
    #[error("Failed to create sidecar {path}: {source}")]
    CreateFailed {
        /// Sidecar path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Sidecar content could not be written.
    #[error("Failed to write sidecar {path}: {source}")]
    WriteFailed {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Safe update failed after the original sidecar was removed.
    ///
    /// The original is gone; the temporary file holds the complete new
    /// content.
    #[error("Safe update of {path} interrupted after delete; new content kept in {temp_path}: {source}")]
    SafeUpdateInterrupted {
        /// Sidecar path
        path: PathBuf,
        /// Temporary file holding the new content
        temp_path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SidecarError {
    /// Whether this error only means "this clip has nothing to sync"
    ///
    /// Callers carry on without touching metadata for these.
    pub fn is_not_applicable(&self) -> bool {
        match self {
            Self::NotAClipPath(_) | Self::ClipNotFound { .. } => true,
            Self::Index(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Version information for the sidecar crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
