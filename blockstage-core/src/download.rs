//! Per-file download: list, fetch, validate, stage, aggregate.
//!
//! Expected failure modes (unknown file, empty file, bad or missing blocks)
//! come back as a [`DownloadResult`] and leave a notification behind. Only
//! staging I/O and invalid file ids surface as `Err`.

use std::sync::{Arc, PoisonError};

use rayon::prelude::*;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    BlockId, DownloadResult, FailedBlock, StagedBlock, StatusClass, content_digest,
};
use crate::error::Result;
use crate::notify::{NotificationKind, NotificationLog};
use crate::source::BlockSource;
use crate::staging::StagingArea;
use crate::validate::Validator;

pub const INVALID_BLOCK_ERROR: &str = "block content invalid";
pub const INVALID_BLOCK_REASON: &str = "content validation failed";
pub const EMPTY_FILE_REASON: &str = "no blocks found";

enum BlockOutcome {
    Staged(StagedBlock),
    Invalid(BlockId),
    FetchFailed { block: BlockId, error: String },
}

pub struct Downloader<S: ?Sized = dyn BlockSource> {
    source: Arc<S>,
    staging: StagingArea,
    validator: Validator,
    notifications: Arc<NotificationLog>,
    parallel: bool,
}

impl<S: BlockSource + ?Sized> Downloader<S> {
    pub fn new(source: Arc<S>, staging: StagingArea, notifications: Arc<NotificationLog>) -> Self {
        Self {
            source,
            staging,
            validator: Validator::default(),
            notifications,
            parallel: false,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Fetch/validate/stage blocks on the rayon pool. Notifications are still
    /// appended in ascending ordinal order once all blocks are back.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn notifications(&self) -> &Arc<NotificationLog> {
        &self.notifications
    }

    #[instrument(skip(self), fields(parallel = self.parallel))]
    pub fn download_file(&self, file_id: &str) -> Result<DownloadResult> {
        let lock = self.staging.file_lock(file_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.staging.ensure_file_dir(file_id)?;

        let listing = match self.source.list_blocks(file_id) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "block listing failed");
                self.notifications.append(
                    NotificationKind::ApiFileError,
                    json!({ "fileId": file_id, "error": e.to_string() }),
                );
                return Ok(DownloadResult::aborted(
                    StatusClass::ServerError,
                    format!("error obtaining listing for {file_id}: {e}"),
                ));
            }
        };

        if listing.is_empty() {
            warn!("file has no blocks");
            self.notifications.append(
                NotificationKind::FileEmpty,
                json!({ "fileId": file_id, "reason": EMPTY_FILE_REASON }),
            );
            return Ok(DownloadResult::aborted(
                StatusClass::NotFound,
                format!("{file_id} is empty or has no valid blocks"),
            ));
        }

        let stale = self.staging.retain_blocks(file_id, &listing.blocks)?;
        if stale > 0 {
            debug!(stale, "dropped staged blocks no longer listed");
        }

        let mut outcomes = Vec::with_capacity(listing.count());
        if self.parallel {
            let done = listing
                .blocks
                .par_iter()
                .map(|&block| self.process_block(file_id, block))
                .collect::<Result<Vec<_>>>()?;
            for outcome in done {
                self.report(file_id, &outcome);
                outcomes.push(outcome);
            }
        } else {
            for &block in &listing.blocks {
                let outcome = self.process_block(file_id, block)?;
                self.report(file_id, &outcome);
                outcomes.push(outcome);
            }
        }

        let result = aggregate(file_id, listing.count(), outcomes);
        info!(
            status = ?result.status_class,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "download finished"
        );
        Ok(result)
    }

    fn process_block(&self, file_id: &str, block: BlockId) -> Result<BlockOutcome> {
        let content = match self.source.fetch_block(file_id, block) {
            Ok(content) => content,
            Err(e) => {
                self.staging.discard_block(file_id, block)?;
                return Ok(BlockOutcome::FetchFailed {
                    block,
                    error: e.to_string(),
                });
            }
        };

        if !self.validator.is_valid(&content) {
            self.staging.discard_block(file_id, block)?;
            return Ok(BlockOutcome::Invalid(block));
        }

        let path = self.staging.write_block(file_id, block, &content)?;
        debug!(%block, bytes = content.len(), "staged");
        Ok(BlockOutcome::Staged(StagedBlock {
            block,
            path,
            digest: content_digest(content.as_bytes()),
        }))
    }

    fn report(&self, file_id: &str, outcome: &BlockOutcome) {
        match outcome {
            BlockOutcome::Staged(_) => {}
            BlockOutcome::Invalid(block) => {
                warn!(%block, "block failed validation");
                self.notifications.append(
                    NotificationKind::InvalidBlock,
                    json!({
                        "fileId": file_id,
                        "blockId": block.ordinal,
                        "reason": INVALID_BLOCK_REASON,
                    }),
                );
            }
            BlockOutcome::FetchFailed { block, error } => {
                warn!(%block, %error, "block fetch failed");
                self.notifications.append(
                    NotificationKind::DownloadError,
                    json!({ "fileId": file_id, "blockId": block.ordinal, "error": error }),
                );
            }
        }
    }
}

fn aggregate(file_id: &str, total: usize, outcomes: Vec<BlockOutcome>) -> DownloadResult {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            BlockOutcome::Staged(staged) => succeeded.push(staged),
            BlockOutcome::Invalid(block) => failed.push(FailedBlock {
                block,
                error: INVALID_BLOCK_ERROR.to_string(),
            }),
            BlockOutcome::FetchFailed { block, error } => failed.push(FailedBlock { block, error }),
        }
    }

    let ok = succeeded.len();
    let (status_class, message) = if total > 0 && ok == total {
        (
            StatusClass::Ok,
            format!("all {total} blocks for {file_id} were downloaded and staged"),
        )
    } else {
        let class = if ok > 0 {
            StatusClass::PartialSuccess
        } else {
            StatusClass::ServerError
        };
        (
            class,
            format!(
                "{ok} of {total} blocks downloaded for {file_id}. Check notifications for errors."
            ),
        )
    };

    DownloadResult {
        success: status_class == StatusClass::Ok,
        status_class,
        message,
        succeeded,
        failed,
    }
}
