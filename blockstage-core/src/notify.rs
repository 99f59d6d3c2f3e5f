//! Append-only log of pipeline anomalies.
//!
//! A log is an explicit value owned by whoever wires the pipeline and shared
//! with the downloader through an `Arc`. Appends are serialized behind one
//! mutex, so the observed order is the append order.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    InvalidBlock,
    DownloadError,
    ApiFileError,
    FileEmpty,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::InvalidBlock => "invalid_block",
            NotificationKind::DownloadError => "download_error",
            NotificationKind::ApiFileError => "api_file_error",
            NotificationKind::FileEmpty => "file_empty",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub data: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Notification {
    pub fn file_id(&self) -> Option<&str> {
        self.data.get("fileId").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, kind: NotificationKind, data: serde_json::Value) {
        let n = Notification {
            kind,
            data,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.entries().push(n);
    }

    /// Snapshot in insertion order.
    pub fn list(&self) -> Vec<Notification> {
        self.entries().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.entries()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
