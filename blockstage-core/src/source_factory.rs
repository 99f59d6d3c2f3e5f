use std::path::PathBuf;
use std::sync::Arc;

use crate::source::BlockStore;
use crate::source_fs::FsBlockSource;
use crate::source_mem::MemBlockSource;

pub enum Backend {
    Fs(PathBuf),
    Memory,
}

pub fn open_source(backend: Backend) -> Arc<dyn BlockStore> {
    match backend {
        Backend::Fs(root) => Arc::new(FsBlockSource::new(root)),
        Backend::Memory => Arc::new(MemBlockSource::new()),
    }
}
