use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::domain::BlockId;
use crate::error::{Result, StageError};
use crate::util::layout::{block_entries, block_file};
use crate::util::sanitize::check_file_id;

pub const DEFAULT_MERGED_SUFFIX: &str = "_merged";

/// On-disk staging: `root/<file_id>/<ordinal>` for validated blocks and
/// `root/<file_id><suffix>` for merge artifacts.
///
/// Clones share the per-file locks, so a downloader and a merger built from
/// the same area never interleave on one file id.
#[derive(Clone, Debug)]
pub struct StagingArea {
    root: PathBuf,
    merged_suffix: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>, merged_suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            merged_suffix: merged_suffix.into(),
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids ending in the merged suffix would share a path with another
    /// file's artifact, so they are refused alongside unsafe names.
    fn check_id<'a>(&self, file_id: &'a str) -> Result<&'a str> {
        let file_id = check_file_id(file_id)?;
        if !self.merged_suffix.is_empty() && file_id.ends_with(&self.merged_suffix) {
            return Err(StageError::InvalidFileId(file_id.to_string()));
        }
        Ok(file_id)
    }

    pub fn file_dir(&self, file_id: &str) -> Result<PathBuf> {
        Ok(self.root.join(self.check_id(file_id)?))
    }

    pub fn ensure_file_dir(&self, file_id: &str) -> Result<PathBuf> {
        let dir = self.file_dir(file_id)?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn block_path(&self, file_id: &str, block: BlockId) -> Result<PathBuf> {
        Ok(block_file(&self.file_dir(file_id)?, block))
    }

    pub fn artifact_path(&self, file_id: &str) -> Result<PathBuf> {
        let name = format!("{}{}", self.check_id(file_id)?, self.merged_suffix);
        Ok(self.root.join(name))
    }

    /// Overwrites any earlier copy of the same block.
    pub fn write_block(&self, file_id: &str, block: BlockId, content: &str) -> Result<PathBuf> {
        let dir = self.ensure_file_dir(file_id)?;
        let path = block_file(&dir, block);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn discard_block(&self, file_id: &str, block: BlockId) -> Result<bool> {
        let path = self.block_path(file_id, block)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Staged blocks in ascending ordinal order. A missing directory is empty.
    pub fn staged_blocks(&self, file_id: &str) -> Result<Vec<(BlockId, PathBuf)>> {
        let dir = self.file_dir(file_id)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        block_entries(&dir)
    }

    /// Drops staged blocks whose ordinal is not in `keep` (sorted ascending);
    /// returns how many were removed.
    pub fn retain_blocks(&self, file_id: &str, keep: &[BlockId]) -> Result<usize> {
        let mut dropped = 0;
        for (block, path) in self.staged_blocks(file_id)? {
            if keep.binary_search(&block).is_err() {
                std::fs::remove_file(path)?;
                dropped += 1;
            }
        }
        Ok(dropped)
    }

    /// Removes every staged block and artifact and recreates an empty root.
    pub fn reset(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Lock serializing downloads and merges of one file id.
    /// Invalid ids are refused before an entry is created.
    pub fn file_lock(&self, file_id: &str) -> Result<Arc<Mutex<()>>> {
        let file_id = self.check_id(file_id)?;
        Ok(self
            .locks
            .entry(file_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}
