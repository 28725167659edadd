//! Caller-facing file handles.

use std::hash::{Hash, Hasher};

use crate::tree::{descendant_prefix, FileRecord};

/// Handle binding a path to one loaded record snapshot.
///
/// The record is never re-read implicitly; operations that change it hand
/// back a fresh handle. Equality and hashing use the path only.
#[derive(Debug, Clone)]
pub struct FileId {
    record: FileRecord,
}

impl FileId {
    pub fn new(record: FileRecord) -> Self {
        Self { record }
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }

    /// Identifier shown to clients; the path.
    pub fn client_id(&self) -> &str {
        &self.record.path
    }

    pub fn is_folder(&self) -> bool {
        self.record.is_folder()
    }

    pub fn is_root(&self) -> bool {
        self.record.is_root()
    }

    /// Whether the handle resolved to a record.
    ///
    /// Handles for unresolved paths carry the zero record and report `false`.
    pub fn exists(&self) -> bool {
        self.record.exists()
    }

    /// Whether `other` lies strictly inside this handle's subtree.
    pub fn contains(&self, other: &FileId) -> bool {
        if !self.exists() || !other.exists() || self.path() == other.path() {
            return false;
        }
        other.path().starts_with(&descendant_prefix(self.path()))
    }

    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    pub fn into_record(self) -> FileRecord {
        self.record
    }
}

impl From<FileRecord> for FileId {
    fn from(record: FileRecord) -> Self {
        Self::new(record)
    }
}

impl PartialEq for FileId {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileId {}

impl Hash for FileId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}
