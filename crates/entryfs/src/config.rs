//! Core and per-volume configuration
//!
//! Both structs deserialize from YAML with every field optional, e.g.
//!
//! ```yaml
//! read_only: false
//! file_copy: true
//! copy_chunk_size: 4096
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deepest path, in segments below the super-root, any operation may reach.
pub const MAX_DEPTH: u16 = 255;

/// Settings for the whole entry layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Reject every mutating operation with `FeatureUnavailable`.
    pub read_only: bool,

    /// Allow renames across volumes (implemented as copy + delete).
    pub file_copy: bool,

    /// Bytes moved per driver call during a cross-volume copy.
    pub copy_chunk_size: usize,

    /// Longest entry name accepted when creating entries.
    pub max_name_len: usize,

    /// Longest volume name accepted by mount.
    pub max_volume_name_len: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            file_copy: true,
            copy_chunk_size: 4096,
            max_name_len: 255,
            max_volume_name_len: 32,
        }
    }
}

/// How a volume may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeAccess {
    #[default]
    ReadWrite,
    ReadOnly,
}

/// Settings applied to one mounted volume.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub access_mode: VolumeAccess,

    /// Sync the driver after every successful mutation.
    pub auto_sync: bool,
}

impl VolumeConfig {
    pub fn read_only() -> Self {
        Self {
            access_mode: VolumeAccess::ReadOnly,
            ..Self::default()
        }
    }

    pub fn auto_sync() -> Self {
        Self {
            auto_sync: true,
            ..Self::default()
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.access_mode == VolumeAccess::ReadOnly
    }
}

impl FsConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: FsConfig = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.copy_chunk_size == 0 {
            return Err(crate::Error::Config("copy_chunk_size must be positive".into()));
        }
        if self.max_name_len == 0 || self.max_volume_name_len == 0 {
            return Err(crate::Error::Config("name limits must be positive".into()));
        }
        Ok(())
    }
}

impl VolumeConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }
}
