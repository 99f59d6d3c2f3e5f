#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;

pub mod util {
    pub mod layout;
    pub mod sanitize;
}

pub mod source;
pub mod source_factory;
pub mod source_fs;
pub mod source_mem;

pub mod download;
pub mod merge;
pub mod notify;
pub mod pipeline;
pub mod seed;
pub mod staging;
pub mod validate;

// Re-exports: stable API surface
pub use config::Config;
pub use domain::{BlockId, BlockListing, DownloadResult, MergedArtifact, StatusClass};
pub use download::Downloader;
pub use error::{Result, StageError};
pub use merge::{MergeError, MergeReport, MergeResult, Merger};
pub use notify::{Notification, NotificationKind, NotificationLog};
pub use pipeline::Pipeline;
pub use source::{BlockSource, BlockStore};
pub use staging::StagingArea;
