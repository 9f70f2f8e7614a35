//! Configuration for sidecar synchronization

use crate::{Result, SidecarError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How an existing sidecar is replaced on update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Truncate and rewrite the existing file in place
    Fast,
    /// Write a temporary file, delete the original, rename into place
    #[default]
    Safe,
}

/// Configuration for sidecar synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Folder under the clip root holding the clip folder
    pub video_dir: String,

    /// Clip folder holding index, stream and sidecar files
    pub clip_dir: String,

    /// Index file extension, without the dot
    pub index_extension: String,

    /// Sidecar file extension, without the dot
    pub sidecar_extension: String,

    /// Largest existing sidecar that will be read (in bytes)
    pub max_sidecar_size: u64,

    /// Replacement strategy for existing sidecars
    pub update_mode: UpdateMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            video_dir: "VIDEO".to_string(),
            clip_dir: "HVR".to_string(),
            index_extension: "IDX".to_string(),
            sidecar_extension: "XMP".to_string(),
            max_sidecar_size: 100 * 1024 * 1024, // 100 MB
            update_mode: UpdateMode::Safe,
        }
    }
}

impl SyncConfig {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SidecarError::Config(format!("cannot open {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SidecarError::Config(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that folder names and extensions are usable
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("video_dir", &self.video_dir),
            ("clip_dir", &self.clip_dir),
            ("index_extension", &self.index_extension),
            ("sidecar_extension", &self.sidecar_extension),
        ] {
            if value.is_empty() {
                return Err(SidecarError::Config(format!("{field} must not be empty")));
            }
            if value.contains(['/', '\\']) {
                return Err(SidecarError::Config(format!(
                    "{field} must be a single path component, got {value:?}"
                )));
            }
        }
        if self.index_extension.eq_ignore_ascii_case(&self.sidecar_extension) {
            return Err(SidecarError::Config(
                "index and sidecar extensions must differ".to_string(),
            ));
        }
        if self.max_sidecar_size == 0 {
            return Err(SidecarError::Config(
                "max_sidecar_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the update mode
    #[must_use]
    pub const fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Set the sidecar size limit
    #[must_use]
    pub const fn with_max_sidecar_size(mut self, size: u64) -> Self {
        self.max_sidecar_size = size;
        self
    }

    /// Set the sidecar extension
    #[must_use]
    pub fn with_sidecar_extension(mut self, extension: impl Into<String>) -> Self {
        self.sidecar_extension = extension.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.video_dir, "VIDEO");
        assert_eq!(config.clip_dir, "HVR");
        assert_eq!(config.max_sidecar_size, 100 * 1024 * 1024);
        assert_eq!(config.update_mode, UpdateMode::Safe);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        write!(file, r#"{{"update_mode": "fast", "max_sidecar_size": 4096}}"#).expect("write");

        let config = SyncConfig::load(file.path()).expect("load");
        assert_eq!(config.update_mode, UpdateMode::Fast);
        assert_eq!(config.max_sidecar_size, 4096);
        assert_eq!(config.sidecar_extension, "XMP");
    }

    #[test]
    fn test_validation() {
        let config = SyncConfig::default().with_sidecar_extension("idx");
        assert!(matches!(config.validate(), Err(SidecarError::Config(_))));

        let config = SyncConfig::default().with_max_sidecar_size(0);
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.clip_dir = "VIDEO/HVR".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        write!(file, "not json").expect("write");
        assert!(matches!(
            SyncConfig::load(file.path()),
            Err(SidecarError::Config(_))
        ));
    }
}
