use std::path::PathBuf;
use std::sync::PoisonError;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{BlockId, MergedArtifact, content_digest};
use crate::error::StageError;
use crate::staging::StagingArea;

/// Merge failures. These never reach the notification log.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("staging path {} not found for file {file_id}", path.display())]
    MissingStaging { path: PathBuf, file_id: String },

    #[error("no blocks found to merge for {file_id}")]
    NoBlocks { file_id: String },

    #[error("error reading {block} during merge: {source}")]
    BlockRead {
        block: BlockId,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was written but is missing or zero bytes; it is left on disk.
    #[error("merged artifact invalid or empty")]
    ArtifactInvalid { path: PathBuf },

    #[error(transparent)]
    Stage(#[from] StageError),
}

pub type MergeResult = std::result::Result<MergedArtifact, MergeError>;

pub struct Merger {
    staging: StagingArea,
}

impl Merger {
    pub fn new(staging: StagingArea) -> Self {
        Self { staging }
    }

    #[instrument(skip(self))]
    pub fn merge_file(&self, file_id: &str) -> MergeResult {
        let lock = self.staging.file_lock(file_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let dir = self.staging.file_dir(file_id)?;
        if !dir.is_dir() {
            return Err(MergeError::MissingStaging {
                path: dir,
                file_id: file_id.to_string(),
            });
        }

        let blocks = self.staging.staged_blocks(file_id)?;
        if blocks.is_empty() {
            return Err(MergeError::NoBlocks {
                file_id: file_id.to_string(),
            });
        }

        let mut content = String::new();
        for (i, (block, path)) in blocks.iter().enumerate() {
            if i > 0 {
                content.push('\n');
            }
            let part = std::fs::read_to_string(path).map_err(|source| MergeError::BlockRead {
                block: *block,
                source,
            })?;
            content.push_str(&part);
        }

        // Written before validation; an empty artifact stays behind on failure.
        let artifact = self.staging.artifact_path(file_id)?;
        std::fs::write(&artifact, &content).map_err(StageError::from)?;

        if !is_valid_artifact(&artifact) {
            warn!(path = %artifact.display(), "merged artifact is empty");
            return Err(MergeError::ArtifactInvalid { path: artifact });
        }

        info!(blocks = blocks.len(), bytes = content.len(), "merged");
        Ok(MergedArtifact {
            digest: content_digest(content.as_bytes()),
            artifact,
            content,
        })
    }
}

fn is_valid_artifact(path: &std::path::Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Wire form of a [`MergeResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MergeReport {
    #[serde(rename_all = "camelCase")]
    Merged {
        success: bool,
        artifact_ref: PathBuf,
        content: String,
        digest: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl MergeReport {
    pub fn is_success(&self) -> bool {
        matches!(self, MergeReport::Merged { .. })
    }
}

impl From<&MergeResult> for MergeReport {
    fn from(result: &MergeResult) -> Self {
        match result {
            Ok(m) => MergeReport::Merged {
                success: true,
                artifact_ref: m.artifact.clone(),
                content: m.content.clone(),
                digest: m.digest.clone(),
            },
            Err(e) => MergeReport::Failed {
                success: false,
                error: e.to_string(),
            },
        }
    }
}
