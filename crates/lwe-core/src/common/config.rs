//! JSON-backed settings for the shard fusion routines.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CHUNK_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCompression {
    Stored,
    #[default]
    Deflated,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FusionConfig {
    pub chunk_bytes: usize,
    pub validate_shard_grids: bool,
    pub compression: EntryCompression,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            validate_shard_grids: true,
            compression: EntryCompression::Deflated,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FusionConfigError {
    #[error("failed to read fusion config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse fusion config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid fusion config '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub fn load_fusion_config(path: impl AsRef<Path>) -> Result<FusionConfig, FusionConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| FusionConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FusionConfig =
        serde_json::from_str(&source).map_err(|source| FusionConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if config.chunk_bytes == 0 {
        return Err(FusionConfigError::Invalid {
            path: path.to_path_buf(),
            message: "chunkBytes must be greater than zero".to_string(),
        });
    }

    Ok(config)
}
