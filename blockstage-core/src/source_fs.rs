use std::path::{Path, PathBuf};

use crate::domain::{BlockId, BlockListing};
use crate::error::{Result, StageError};
use crate::source::{BlockSource, BlockStore};
use crate::util::layout::{block_entries, block_file};
use crate::util::sanitize::check_file_id;

/// Directory-backed source: `root/<file_id>/<ordinal>`, plain text.
pub struct FsBlockSource {
    root: PathBuf,
}

impl FsBlockSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_dir(&self, file_id: &str) -> Result<PathBuf> {
        Ok(self.root.join(check_file_id(file_id)?))
    }
}

impl BlockSource for FsBlockSource {
    fn list_blocks(&self, file_id: &str) -> Result<BlockListing> {
        let dir = self.file_dir(file_id)?;
        if !dir.is_dir() {
            return Err(StageError::FileNotFound(file_id.to_string()));
        }
        let blocks = block_entries(&dir)?.into_iter().map(|(b, _)| b).collect();
        Ok(BlockListing::new(file_id, blocks))
    }

    fn fetch_block(&self, file_id: &str, block: BlockId) -> Result<String> {
        let path = block_file(&self.file_dir(file_id)?, block);
        if !path.is_file() {
            return Err(StageError::BlockNotFound {
                file_id: file_id.to_string(),
                block,
            });
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

impl BlockStore for FsBlockSource {
    fn put_block(&self, file_id: &str, block: BlockId, content: &str) -> Result<()> {
        let dir = self.file_dir(file_id)?;
        std::fs::create_dir_all(&dir)?;
        std::fs::write(block_file(&dir, block), content)?;
        Ok(())
    }

    fn remove_file(&self, file_id: &str) -> Result<()> {
        let dir = self.file_dir(file_id)?;
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
