use std::path::{Path, PathBuf};

use crate::domain::BlockId;
use crate::error::Result;

/// Blocks live one per file, named by their decimal ordinal, directly under
/// `dir`. Other entries (subdirectories, `0`, non-numeric names) are skipped.
pub fn block_entries(dir: &Path) -> Result<Vec<(BlockId, PathBuf)>> {
    let mut out = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(block) = entry
            .file_name()
            .to_str()
            .and_then(|n| n.parse::<u64>().ok())
            .and_then(BlockId::new)
        else {
            continue;
        };
        out.push((block, entry.into_path()));
    }
    out.sort_unstable_by_key(|(b, _)| *b);
    Ok(out)
}

pub fn block_file(dir: &Path, block: BlockId) -> PathBuf {
    dir.join(block.ordinal.to_string())
}
