use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::{BlockId, BlockListing};
use crate::error::{Result, StageError};
use crate::source::{BlockSource, BlockStore};
use crate::util::sanitize::check_file_id;

#[derive(Default)]
pub struct MemBlockSource {
    files: RwLock<BTreeMap<String, BTreeMap<BlockId, String>>>,
}

impl MemBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `file_id` with no blocks.
    pub fn create_empty(&self, file_id: &str) -> Result<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.entry(check_file_id(file_id)?.to_string()).or_default();
        Ok(())
    }
}

impl BlockSource for MemBlockSource {
    fn list_blocks(&self, file_id: &str) -> Result<BlockListing> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let blocks = files
            .get(file_id)
            .ok_or_else(|| StageError::FileNotFound(file_id.to_string()))?;
        Ok(BlockListing::new(file_id, blocks.keys().copied().collect()))
    }

    fn fetch_block(&self, file_id: &str, block: BlockId) -> Result<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .get(file_id)
            .and_then(|blocks| blocks.get(&block))
            .cloned()
            .ok_or_else(|| StageError::BlockNotFound {
                file_id: file_id.to_string(),
                block,
            })
    }
}

impl BlockStore for MemBlockSource {
    fn put_block(&self, file_id: &str, block: BlockId, content: &str) -> Result<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files
            .entry(check_file_id(file_id)?.to_string())
            .or_default()
            .insert(block, content.to_string());
        Ok(())
    }

    fn remove_file(&self, file_id: &str) -> Result<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.remove(file_id);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
