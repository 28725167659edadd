//! dbdrive - a virtual file tree stored in a relational table.
//!
//! Folder structure and file metadata live in one SQLite relation, one row
//! per file or folder, each row carrying its full path. File bytes live as
//! immutable blobs in a plain directory.

pub mod config;
pub mod content;
pub mod db;
pub mod drive;
pub mod error;
pub mod logging;
pub mod tree;

pub use config::Config;
pub use content::ContentStore;
pub use db::{Database, Relation};
pub use drive::{DbDrive, DriveStats, FileId, FileInfo, Operation};
pub use error::{DriveError, Result};
pub use tree::{FileKind, FileRecord, NewRecord, TreeRepository};
