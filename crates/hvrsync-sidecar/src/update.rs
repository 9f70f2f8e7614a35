//! Sidecar persistence
//!
//! Three strategies, picked from the prior file state and the update mode:
//!
//! 1. No open handle: create the sidecar and write it.
//! 2. Open handle, fast mode: truncate in place and rewrite.
//! 3. Open handle, safe mode: write a temporary file next to the sidecar,
//!    close both handles, delete the original, rename the temporary file
//!    into place.
//!
//! In safe mode a failure before the delete leaves the original intact.
//! A failure between delete and rename loses the original; the temporary
//! file is kept and reported in [`SidecarError::SafeUpdateInterrupted`].

use crate::config::UpdateMode;
use crate::{Result, SidecarError};
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File system operations used while persisting a sidecar
pub trait SidecarFs {
    /// Create (or truncate) a file for writing
    fn create(&self, path: &Path) -> io::Result<File>;

    /// Create a uniquely named file in the same folder as `target`
    ///
    /// The file outlives the returned handle.
    fn create_temp(&self, target: &Path) -> io::Result<(File, PathBuf)>;

    /// Delete a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename a file
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`SidecarFs`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl SidecarFs for StdFs {
    fn create(&self, path: &Path) -> io::Result<File> {
        File::create(path)
    }

    fn create_temp(&self, target: &Path) -> io::Result<(File, PathBuf)> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = target
            .file_name()
            .map(|name| format!("{}.", name.to_string_lossy()))
            .unwrap_or_default();

        tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)?
            .keep()
            .map_err(|e| e.error)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// How a sidecar was persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStrategy {
    /// New file created
    Create,
    /// Existing file truncated and rewritten in place
    Overwrite,
    /// Temporary file renamed over the deleted original
    SafeReplace,
}

/// Writes serialized sidecar content to disk
#[derive(Debug, Clone, Default)]
pub struct UpdateCoordinator<F = StdFs> {
    fs: F,
}

impl UpdateCoordinator<StdFs> {
    /// Create a coordinator using the real file system
    pub fn new() -> Self {
        Self { fs: StdFs }
    }
}

impl<F: SidecarFs> UpdateCoordinator<F> {
    /// Create a coordinator with custom file system operations
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// Persist `data` as the sidecar at `path`
    ///
    /// `existing` is the handle retained from opening the sidecar, if it
    /// existed. It must be open for writing when `mode` is
    /// [`UpdateMode::Fast`]. The handle is consumed either way.
    pub fn persist(
        &self,
        path: &Path,
        existing: Option<File>,
        mode: UpdateMode,
        data: &[u8],
    ) -> Result<PersistStrategy> {
        match (existing, mode) {
            (None, _) => {
                self.create(path, data)?;
                Ok(PersistStrategy::Create)
            }
            (Some(file), UpdateMode::Fast) => {
                Self::overwrite(file, path, data)?;
                Ok(PersistStrategy::Overwrite)
            }
            (Some(file), UpdateMode::Safe) => {
                self.safe_replace(file, path, data)?;
                Ok(PersistStrategy::SafeReplace)
            }
        }
    }

    fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut file = self
            .fs
            .create(path)
            .map_err(|source| SidecarError::CreateFailed {
                path: path.to_path_buf(),
                source,
            })?;
        write_synced(&mut file, data).map_err(|source| SidecarError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Created sidecar {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn overwrite(mut file: File, path: &Path, data: &[u8]) -> Result<()> {
        rewrite(&mut file, data).map_err(|source| SidecarError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Rewrote sidecar {} in place ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn safe_replace(&self, existing: File, path: &Path, data: &[u8]) -> Result<()> {
        let (mut temp, temp_path) =
            self.fs
                .create_temp(path)
                .map_err(|source| SidecarError::CreateFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
        debug!("Writing {} before replacing {}", temp_path.display(), path.display());

        if let Err(source) = write_synced(&mut temp, data) {
            drop(temp);
            let _ = self.fs.remove_file(&temp_path);
            return Err(SidecarError::WriteFailed {
                path: temp_path,
                source,
            });
        }

        // Both handles must be closed before the original can go away
        drop(temp);
        drop(existing);

        if let Err(source) = self.fs.remove_file(path) {
            let _ = self.fs.remove_file(&temp_path);
            return Err(SidecarError::WriteFailed {
                path: path.to_path_buf(),
                source,
            });
        }

        if let Err(source) = self.fs.rename(&temp_path, path) {
            warn!(
                "Sidecar {} was deleted but {} could not be renamed into place",
                path.display(),
                temp_path.display()
            );
            return Err(SidecarError::SafeUpdateInterrupted {
                path: path.to_path_buf(),
                temp_path,
                source,
            });
        }

        debug!("Replaced sidecar {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}

fn rewrite(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.set_len(0)?;
    write_synced(file, data)
}

fn write_synced(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.write_all(data)?;
    file.sync_all()
}
