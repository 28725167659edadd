//! Read-only projections returned by the drive.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FileId;
use crate::tree::{FileKind, FileRecord};

/// Info projection of one record.
///
/// `children` stays `None` unless a caller attaches a listing.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    #[serde(flatten)]
    record: FileRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<FileInfo>>,
}

impl FileInfo {
    pub fn new(record: FileRecord) -> Self {
        Self {
            record,
            children: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }

    pub fn size(&self) -> u64 {
        self.record.size_bytes()
    }

    pub fn kind(&self) -> FileKind {
        self.record.kind
    }

    pub fn is_dir(&self) -> bool {
        self.record.is_folder()
    }

    pub fn mod_time(&self) -> DateTime<Utc> {
        self.record.modified_at
    }

    /// Handle for the described record.
    pub fn file(&self) -> FileId {
        FileId::new(self.record.clone())
    }

    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    pub fn children(&self) -> Option<&[FileInfo]> {
        self.children.as_deref()
    }

    pub fn set_children(&mut self, children: Vec<FileInfo>) {
        self.children = Some(children);
    }
}

/// Usage figures of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DriveStats {
    /// Sum of record sizes in bytes.
    pub used_bytes: u64,
    /// Reserved second axis; always 0.
    pub reserved: u64,
}
