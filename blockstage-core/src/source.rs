// blockstage_core/src/source.rs
use crate::domain::{BlockId, BlockListing};
use crate::error::Result;

/// Read side of an upstream block provider.
pub trait BlockSource: Send + Sync {
    /// `Err` when the file is unknown or unreadable. A known file with no
    /// blocks is an empty listing, not an error.
    fn list_blocks(&self, file_id: &str) -> Result<BlockListing>;

    fn fetch_block(&self, file_id: &str, block: BlockId) -> Result<String>;
}

/// Sources that can be seeded and reset from outside the pipeline.
pub trait BlockStore: BlockSource {
    fn put_block(&self, file_id: &str, block: BlockId, content: &str) -> Result<()>;

    fn remove_file(&self, file_id: &str) -> Result<()>;

    fn reset(&self) -> Result<()>;
}
