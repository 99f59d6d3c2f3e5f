use crate::error::{Result, StageError};

/// File ids become directory names under the source and staging roots, so
/// anything that could escape the root or collide with a separator is refused.
pub fn check_file_id(file_id: &str) -> Result<&str> {
    let bad = file_id.is_empty()
        || file_id == "."
        || file_id == ".."
        || file_id.contains(['/', '\\', '\0']);
    if bad {
        return Err(StageError::InvalidFileId(file_id.to_string()));
    }
    Ok(file_id)
}
