use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StageError};
use crate::staging::DEFAULT_MERGED_SUFFIX;
use crate::validate::DEFAULT_CORRUPTION_MARKER;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Fs,
    Memory,
}

/// Pipeline settings. Every field has a default, so a TOML file only needs
/// the keys it wants to change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceKind,
    /// Root of the block source when `source = "fs"`.
    pub source_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Blocks containing this substring are rejected.
    pub corruption_marker: String,
    pub merged_suffix: String,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Fs,
            source_dir: PathBuf::from("api"),
            staging_dir: PathBuf::from("temp"),
            corruption_marker: DEFAULT_CORRUPTION_MARKER.to_string(),
            merged_suffix: DEFAULT_MERGED_SUFFIX.to_string(),
            parallel: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StageError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| StageError::Config(format!("{}: {e}", path.display())))
    }
}
