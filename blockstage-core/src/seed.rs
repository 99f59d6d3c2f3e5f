use tracing::info;

use crate::domain::BlockId;
use crate::error::Result;
use crate::source::BlockStore;

/// Files written by [`seed_demo`], with their block counts.
pub const DEMO_FILES: &[(&str, u64)] = &[("Math", 5), ("Language", 3), ("History", 7)];

pub fn block_content(file_id: &str, ordinal: u64) -> String {
    format!("Content of {file_id} block {ordinal}")
}

/// Replaces `file_id` with blocks `1..=count` of generated text.
pub fn seed_file(store: &dyn BlockStore, file_id: &str, count: u64) -> Result<()> {
    store.remove_file(file_id)?;
    for ordinal in 1..=count {
        if let Some(block) = BlockId::new(ordinal) {
            store.put_block(file_id, block, &block_content(file_id, ordinal))?;
        }
    }
    info!(file_id, count, "seeded");
    Ok(())
}

/// Resets the store and seeds [`DEMO_FILES`].
pub fn seed_demo(store: &dyn BlockStore) -> Result<()> {
    store.reset()?;
    for (file_id, count) in DEMO_FILES {
        seed_file(store, file_id, *count)?;
    }
    Ok(())
}
