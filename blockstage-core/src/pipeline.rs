use std::sync::Arc;

use crate::config::{Config, SourceKind};
use crate::domain::DownloadResult;
use crate::download::Downloader;
use crate::error::Result;
use crate::merge::{MergeResult, Merger};
use crate::notify::NotificationLog;
use crate::source::BlockStore;
use crate::source_factory::{Backend, open_source};
use crate::staging::StagingArea;
use crate::validate::Validator;

/// A block store, a staging area and one notification log, wired together.
pub struct Pipeline {
    store: Arc<dyn BlockStore>,
    notifications: Arc<NotificationLog>,
    downloader: Downloader<dyn BlockStore>,
    merger: Merger,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Self {
        let backend = match config.source {
            SourceKind::Fs => Backend::Fs(config.source_dir.clone()),
            SourceKind::Memory => Backend::Memory,
        };
        Self::with_store(open_source(backend), config)
    }

    pub fn with_store(store: Arc<dyn BlockStore>, config: &Config) -> Self {
        let notifications = Arc::new(NotificationLog::new());
        let staging = StagingArea::new(&config.staging_dir, config.merged_suffix.clone());
        let downloader = Downloader::new(
            Arc::clone(&store),
            staging.clone(),
            Arc::clone(&notifications),
        )
        .with_validator(Validator::new(config.corruption_marker.clone()))
        .with_parallel(config.parallel);
        Self {
            store,
            notifications,
            downloader,
            merger: Merger::new(staging),
        }
    }

    pub fn store(&self) -> &dyn BlockStore {
        self.store.as_ref()
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn staging(&self) -> &StagingArea {
        self.downloader.staging()
    }

    pub fn download_file(&self, file_id: &str) -> Result<DownloadResult> {
        self.downloader.download_file(file_id)
    }

    pub fn merge_file(&self, file_id: &str) -> MergeResult {
        self.merger.merge_file(file_id)
    }
}
