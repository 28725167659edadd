//! File record types for the tree store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{DriveError, Result};

/// Path of the root folder of every partition.
pub const ROOT_PATH: &str = "/";

/// Path separator.
pub const SEPARATOR: char = '/';

/// Kind of a record. Stored as an integer: File = 1, Folder = 2 (0 unused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    File = 1,
    Folder = 2,
}

impl FileKind {
    /// Kind for the given folder flag.
    pub fn from_is_folder(is_folder: bool) -> Self {
        if is_folder {
            FileKind::Folder
        } else {
            FileKind::File
        }
    }

    /// Integer code stored in the relation.
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Unknown kind code read from the store.
#[derive(Debug, Error)]
#[error("invalid file kind: {0}")]
pub struct InvalidFileKind(pub i64);

impl TryFrom<i64> for FileKind {
    type Error = InvalidFileKind;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(FileKind::File),
            2 => Ok(FileKind::Folder),
            other => Err(InvalidFileKind(other)),
        }
    }
}

/// One row of the file relation.
///
/// The `Default` value is the zero record handed out for unresolved paths.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
pub struct FileRecord {
    /// Store-assigned id; 0 for the zero record.
    pub id: i64,
    /// Leaf name; empty for the root.
    pub name: String,
    #[sqlx(rename = "type", try_from = "i64")]
    pub kind: FileKind,
    /// Absolute path, unique within the partition.
    pub path: String,
    /// Blob id of the current content; empty when never written.
    #[sqlx(rename = "content")]
    pub content_ref: String,
    /// Size in bytes.
    pub size: i64,
    #[sqlx(rename = "modified")]
    pub modified_at: DateTime<Utc>,
    /// Id of the containing folder; the root row points at itself.
    #[sqlx(rename = "folder")]
    pub parent_id: i64,
    #[sqlx(rename = "tree")]
    pub tree_id: i64,
}

impl FileRecord {
    /// Stand-in root for a partition whose root row is missing.
    ///
    /// It has no store id; records made under it get parent id 0.
    pub fn synthetic_root(tree_id: i64) -> Self {
        Self {
            kind: FileKind::Folder,
            path: ROOT_PATH.to_string(),
            tree_id,
            ..Self::default()
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    /// Whether this record came from the store or is a partition root.
    pub fn exists(&self) -> bool {
        self.id != 0 || self.is_root()
    }

    /// Whether a blob has been written for this record.
    pub fn has_content(&self) -> bool {
        !self.content_ref.is_empty()
    }

    /// Size in bytes as an unsigned value.
    pub fn size_bytes(&self) -> u64 {
        self.size.max(0) as u64
    }
}

/// Data for inserting a new record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub kind: FileKind,
    pub path: String,
    pub parent_id: i64,
    pub size: i64,
    pub content_ref: String,
    pub modified_at: DateTime<Utc>,
}

impl NewRecord {
    /// An empty record of the given kind, modified now.
    pub fn new(
        name: impl Into<String>,
        kind: FileKind,
        parent_id: i64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
            parent_id,
            size: 0,
            content_ref: String::new(),
            modified_at: Utc::now(),
        }
    }

    /// A duplicate of `source` placed at a new location.
    ///
    /// Size, content reference and modification time are carried over, so the
    /// copy shares the source's blob.
    pub fn duplicate(
        source: &FileRecord,
        name: impl Into<String>,
        parent_id: i64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: source.kind,
            path: path.into(),
            parent_id,
            size: source.size,
            content_ref: source.content_ref.clone(),
            modified_at: source.modified_at,
        }
    }
}

/// Join a parent path and a leaf name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH || parent.is_empty() {
        format!("{SEPARATOR}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Give a caller-supplied path a leading separator and no trailing one.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with(SEPARATOR) {
        trimmed.to_string()
    } else {
        format!("{SEPARATOR}{trimmed}")
    }
}

/// Prefix shared by every descendant of `path`.
pub fn descendant_prefix(path: &str) -> String {
    if path == ROOT_PATH {
        ROOT_PATH.to_string()
    } else {
        format!("{path}{SEPARATOR}")
    }
}

/// Check that a leaf name can be stored.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DriveError::Validation("name must not be empty".to_string()));
    }
    if name.contains(SEPARATOR) {
        return Err(DriveError::Validation(format!(
            "name '{name}' must not contain '{SEPARATOR}'"
        )));
    }
    if name == "." || name == ".." {
        return Err(DriveError::Validation(format!("name '{name}' is reserved")));
    }
    Ok(())
}
