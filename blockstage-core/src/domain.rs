// blockstage_core/src/domain.rs
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Position of a block inside its file. Concatenation order is ordinal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub ordinal: u64,
}

impl BlockId {
    /// Ordinals are positive; `0` is rejected.
    pub fn new(ordinal: u64) -> Option<Self> {
        (ordinal > 0).then_some(Self { ordinal })
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block{}", self.ordinal)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockListing {
    pub file_id: String,
    pub blocks: Vec<BlockId>,
}

impl BlockListing {
    /// Sorts ascending and drops duplicate ordinals.
    pub fn new(file_id: impl Into<String>, mut blocks: Vec<BlockId>) -> Self {
        blocks.sort_unstable();
        blocks.dedup();
        Self {
            file_id: file_id.into(),
            blocks,
        }
    }

    pub fn count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Ok,
    PartialSuccess,
    NotFound,
    ServerError,
}

impl StatusClass {
    pub fn http_status(self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::PartialSuccess => 207,
            StatusClass::NotFound => 404,
            StatusClass::ServerError => 500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedBlock {
    pub block: BlockId,
    pub path: PathBuf,
    /// BLAKE3 of the staged content, hex.
    pub digest: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBlock {
    pub block: BlockId,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    pub status_class: StatusClass,
    pub message: String,
    pub succeeded: Vec<StagedBlock>,
    pub failed: Vec<FailedBlock>,
}

impl DownloadResult {
    /// Short-circuit result: nothing was attempted.
    pub fn aborted(status_class: StatusClass, message: String) -> Self {
        Self {
            success: false,
            status_class,
            message,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedArtifact {
    pub artifact: PathBuf,
    pub content: String,
    pub digest: String,
}

pub fn content_digest(content: &[u8]) -> String {
    hex::encode(blake3::hash(content).as_bytes())
}
