//! Clip and index file discovery
//!
//! A client can name a clip two ways:
//!
//! - a logical clip path, `<root>/00_0001` or `<root>/00_0001_2007-08-06_165555`
//! - a file inside the clip folder, `<root>/VIDEO/HVR/00_0001_2007-08-06_165555.M2T`
//!
//! Either way only the part before the second underscore identifies the
//! clip family, and an index file starting with that prefix must exist.
//! Name comparisons are case-insensitive.

use crate::config::SyncConfig;
use crate::{Result, SidecarError};
use hvrsync_formats::ClipName;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A resolved clip: the folder holding `VIDEO/` and the clip token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipIdentity {
    /// Clip root folder
    pub root: PathBuf,
    /// Clip token as requested
    pub clip: ClipName,
}

/// Uppercased clip-family prefix, ending in `_`
///
/// The candidate is cut at its second underscore, so `00_0001` and
/// `00_0001_2007-08-06_165555` both give `00_0001_`.
pub fn clip_family_prefix(candidate: &str) -> String {
    let mut prefix: String = candidate
        .char_indices()
        .filter(|&(_, c)| c == '_')
        .nth(1)
        .map_or(candidate, |(i, _)| &candidate[..i])
        .to_ascii_uppercase();
    prefix.push('_');
    prefix
}

/// Resolves clip tokens to index and sidecar paths
#[derive(Debug, Clone)]
pub struct ClipLocator {
    video_dir: String,
    clip_dir: String,
    index_extension: String,
    sidecar_extension: String,
}

impl ClipLocator {
    /// Create a locator for the folder layout in `config`
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            video_dir: config.video_dir.clone(),
            clip_dir: config.clip_dir.clone(),
            index_extension: config.index_extension.clone(),
            sidecar_extension: config.sidecar_extension.clone(),
        }
    }

    /// Folder holding the clip files under `root`
    pub fn clip_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.video_dir).join(&self.clip_dir)
    }

    /// First index file in the clip folder whose name starts with the
    /// candidate's clip-family prefix
    ///
    /// Entries are taken in directory enumeration order, with no sorting.
    pub fn find_index_by_prefix(&self, root: &Path, candidate: &str) -> Result<PathBuf> {
        let dir = self.clip_dir(root);
        let prefix = clip_family_prefix(candidate);
        let suffix = format!(".{}", self.index_extension.to_ascii_uppercase());

        let not_found = || SidecarError::ClipNotFound {
            clip: candidate.to_string(),
            dir: dir.clone(),
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_ascii_uppercase();
            if name.ends_with(&suffix) && name.starts_with(&prefix) {
                debug!("Index {} matches clip prefix {}", name, prefix);
                return Ok(entry.path());
            }
        }

        Err(not_found())
    }

    /// Index file for a resolved clip
    ///
    /// Tries `<clip>.<ext>` directly, then falls back to the prefix scan,
    /// which covers renamed and segmented clips.
    pub fn index_path_for(&self, identity: &ClipIdentity) -> Result<PathBuf> {
        let direct = self.clip_dir(&identity.root).join(format!(
            "{}.{}",
            identity.clip, self.index_extension
        ));
        if direct.is_file() {
            return Ok(direct);
        }
        debug!(
            "No index at {}, scanning for clip family",
            direct.display()
        );
        self.find_index_by_prefix(&identity.root, identity.clip.as_str())
    }

    /// Sidecar path for a resolved clip
    pub fn sidecar_path_for(&self, identity: &ClipIdentity) -> PathBuf {
        self.clip_dir(&identity.root).join(format!(
            "{}.{}",
            identity.clip, self.sidecar_extension
        ))
    }

    /// Resolve a root folder and clip token
    ///
    /// The token is validated before any file system access. The identity
    /// keeps the token as given rather than the matched index name;
    /// multi-segment clips are not stitched together.
    pub fn resolve_parts(&self, root: &Path, token: &str) -> Result<ClipIdentity> {
        let clip = ClipName::parse(token)?;
        self.find_index_by_prefix(root, token)?;
        Ok(ClipIdentity {
            root: root.to_path_buf(),
            clip,
        })
    }

    /// Resolve a logical clip path or a path to a file in the clip folder
    pub fn resolve_clip(&self, path: &Path) -> Result<ClipIdentity> {
        let not_clip = || SidecarError::NotAClipPath(path.to_path_buf());

        if path.is_file() {
            let parent = path.parent().ok_or_else(not_clip)?;
            let grandparent = parent.parent().ok_or_else(not_clip)?;
            let root = grandparent.parent().ok_or_else(not_clip)?;

            if !component_matches(parent, &self.clip_dir)
                || !component_matches(grandparent, &self.video_dir)
            {
                return Err(not_clip());
            }

            let token = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(not_clip)?;
            return self.resolve_parts(root, token);
        }

        let root = path.parent().ok_or_else(not_clip)?;
        let token = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(not_clip)?;
        ClipName::parse(token)?;

        if !self.clip_dir(root).is_dir() {
            return Err(not_clip());
        }
        self.resolve_parts(root, token)
    }
}

fn component_matches(path: &Path, expected: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(expected))
}
