//! Drive facade for dbdrive.
//!
//! `DbDrive` combines the tree store and the content store into the file
//! operations a virtual filesystem layer calls: make, copy, move, remove,
//! read, write, list, search, info, parent lookup, existence checks and
//! usage stats.
//!
//! Each operation is a sequence of independent statements. There is no
//! transaction around recursive copy, move or remove; a failure midway leaves
//! the partial result in place and is reported to the caller.

mod handle;
mod info;

pub use handle::FileId;
pub use info::{DriveStats, FileInfo};

use std::collections::VecDeque;

use chrono::Utc;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::ContentStore;
use crate::db::{Database, Relation};
use crate::tree::{
    join_path, normalize_path, validate_name, FileKind, FileRecord, NewRecord, TreeRepository,
};
use crate::{DriveError, Result};

/// Operation kinds a facade may ask [`DbDrive::comply`] about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Make,
    Copy,
    Move,
    Remove,
    List,
    Search,
}

/// A drive over one tree partition of a relation plus a blob directory.
#[derive(Debug, Clone)]
pub struct DbDrive {
    tree: TreeRepository,
    content: ContentStore,
    root: FileRecord,
}

impl DbDrive {
    /// Create a drive for partition `tree_id` of `relation`.
    ///
    /// Migrates the relation and seeds the partition's root folder.
    pub async fn new(
        db: &Database,
        relation: Relation,
        tree_id: i64,
        content: ContentStore,
    ) -> Result<Self> {
        if tree_id <= 0 {
            return Err(DriveError::Validation(format!(
                "tree id must be positive, got {tree_id}"
            )));
        }

        db.migrate(&relation).await?;
        let tree = TreeRepository::new(db.pool().clone(), relation, tree_id);
        let root = tree.ensure_root().await?;

        info!(
            "Drive ready on {} tree {} (content in {:?})",
            tree.relation(),
            tree_id,
            content.base_path()
        );

        Ok(Self {
            tree,
            content,
            root,
        })
    }

    /// Open the database and content directory named by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let db = Database::open(&config.database.path).await?;
        let relation = Relation::new(&config.drive.relation)?;
        let content = ContentStore::new(&config.drive.content_path)?;

        Self::new(&db, relation, config.drive.tree_id, content).await
    }

    pub fn tree_id(&self) -> i64 {
        self.tree.tree_id()
    }

    /// Handle for the partition root.
    pub fn root(&self) -> FileId {
        FileId::new(self.root.clone())
    }

    /// Access check. This drive allows everything.
    pub fn comply(&self, _file: &FileId, _operation: Operation) -> bool {
        true
    }

    /// Handle for the folder containing `file`.
    ///
    /// Falls back to the root handle when the parent is the root or cannot be
    /// loaded.
    pub async fn get_parent(&self, file: &FileId) -> FileId {
        let parent_id = file.record().parent_id;
        if file.is_root() || parent_id == self.root.id {
            return self.root();
        }

        match self.tree.get_by_id(parent_id).await {
            Ok(Some(parent)) => FileId::new(parent),
            Ok(None) => {
                debug!("Parent {} of {} is gone", parent_id, file.path());
                self.root()
            }
            Err(e) => {
                warn!("Parent lookup for {} failed: {}", file.path(), e);
                self.root()
            }
        }
    }

    /// Resolve a path to a handle.
    ///
    /// An unresolved path yields a handle carrying the zero record; check
    /// [`FileId::exists`] before relying on it.
    pub async fn to_file_id(&self, path: &str) -> FileId {
        let path = normalize_path(path);
        match self.tree.get_by_path(&path).await {
            Ok(Some(record)) => FileId::new(record),
            Ok(None) => FileId::new(FileRecord::default()),
            Err(e) => {
                warn!("Lookup of {} failed: {}", path, e);
                FileId::new(FileRecord::default())
            }
        }
    }

    /// Create an empty file or folder named `name` inside `parent`.
    pub async fn make(&self, parent: &FileId, name: &str, is_folder: bool) -> Result<FileId> {
        validate_name(name)?;
        Self::require_folder(parent)?;

        let kind = FileKind::from_is_folder(is_folder);
        let path = join_path(parent.path(), name);
        let record = self
            .tree
            .insert(&NewRecord::new(name, kind, parent.record().id, path))
            .await?;

        debug!("Made {:?} {}", kind, record.path);
        Ok(FileId::new(record))
    }

    /// Whether `parent` has a child named `name`.
    ///
    /// Lookup errors count as "no".
    pub async fn exists(&self, parent: &FileId, name: &str) -> bool {
        match self
            .tree
            .get_by_parent_and_name(parent.record().id, name)
            .await
        {
            Ok(found) => found.is_some(),
            Err(e) => {
                debug!("Existence check for {} in {} failed: {}", name, parent.path(), e);
                false
            }
        }
    }

    /// Copy `source` into `target` under `name`.
    ///
    /// Folders are copied with their whole subtree, parents before children.
    /// Copies share blobs with their originals.
    pub async fn copy(
        &self,
        source: &FileId,
        target: &FileId,
        name: &str,
        is_folder: bool,
    ) -> Result<FileId> {
        validate_name(name)?;
        Self::require_movable(source, target, "copy")?;
        if is_folder != source.is_folder() {
            return Err(DriveError::Validation(format!(
                "{} is {}a folder",
                source.path(),
                if source.is_folder() { "" } else { "not " }
            )));
        }

        let dest = join_path(target.path(), name);
        let top = self
            .tree
            .insert(&NewRecord::duplicate(
                source.record(),
                name,
                target.record().id,
                dest,
            ))
            .await?;

        let mut copied = 1;
        let mut pending = VecDeque::new();
        if top.is_folder() {
            pending.push_back((source.record().id, top.clone()));
        }

        while let Some((from_id, to)) = pending.pop_front() {
            for child in self.tree.list_children(from_id).await? {
                let path = join_path(&to.path, &child.name);
                let copy = self
                    .tree
                    .insert(&NewRecord::duplicate(&child, &child.name, to.id, path))
                    .await?;
                copied += 1;

                if child.is_folder() {
                    pending.push_back((child.id, copy));
                }
            }
        }

        debug!("Copied {} to {} ({} records)", source.path(), top.path, copied);
        Ok(FileId::new(top))
    }

    /// Move `source` into `target` under `name`, rewriting descendant paths.
    pub async fn move_to(&self, source: &FileId, target: &FileId, name: &str) -> Result<FileId> {
        validate_name(name)?;
        Self::require_movable(source, target, "move")?;

        let id = source.record().id;
        let old_path = source.path();
        let new_path = join_path(target.path(), name);

        if !self
            .tree
            .update_location(id, name, target.record().id, &new_path)
            .await?
        {
            return Err(DriveError::NotFound(format!("record {old_path}")));
        }

        let mut rewritten = 0;
        if new_path != old_path {
            for descendant in self.tree.list_by_path_prefix(old_path).await? {
                let path = format!("{new_path}{}", &descendant.path[old_path.len()..]);
                self.tree.update_path(descendant.id, &path).await?;
                rewritten += 1;
            }
        }

        debug!(
            "Moved {} to {} ({} descendants)",
            old_path, new_path, rewritten
        );

        self.tree
            .get_by_id(id)
            .await?
            .map(FileId::new)
            .ok_or_else(|| DriveError::NotFound(format!("record {new_path}")))
    }

    /// Delete `target` and everything below it.
    pub async fn remove(&self, target: &FileId) -> Result<()> {
        if !target.exists() {
            return Err(DriveError::NotFound(format!("record {}", target.path())));
        }
        if target.is_root() {
            return Err(DriveError::Validation(
                "the root folder cannot be removed".to_string(),
            ));
        }

        let removed = self.tree.delete_by_id(target.record().id).await?;
        let descendants = self.tree.delete_by_path_prefix(target.path()).await?;

        debug!(
            "Removed {} (own record: {}, {} descendants)",
            target.path(),
            removed,
            descendants
        );
        Ok(())
    }

    /// Open the content of `target` for reading.
    pub async fn read(&self, target: &FileId) -> Result<File> {
        if target.is_folder() {
            return Err(DriveError::Validation(format!(
                "{} is a folder",
                target.path()
            )));
        }
        if !target.record().has_content() {
            return Err(DriveError::NotFound(format!("content of {}", target.path())));
        }

        self.content.read(&target.record().content_ref).await
    }

    /// Replace the content of `target` with everything read from `data`.
    ///
    /// The bytes go to a new blob; the previous blob is left in place.
    /// Returns a handle carrying the updated record.
    pub async fn write<R>(&self, target: &FileId, data: &mut R) -> Result<FileId>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if !target.exists() {
            return Err(DriveError::NotFound(format!("record {}", target.path())));
        }
        if target.is_folder() {
            return Err(DriveError::Validation(format!(
                "{} is a folder",
                target.path()
            )));
        }

        let (blob_id, size) = self.content.write(data).await?;
        let size = i64::try_from(size)
            .map_err(|_| DriveError::Validation(format!("{size} bytes is too large")))?;

        let id = target.record().id;
        if !self
            .tree
            .update_content(id, size, &blob_id, Utc::now())
            .await?
        {
            warn!("Record {} vanished; blob {} is orphaned", target.path(), blob_id);
            return Err(DriveError::NotFound(format!("record {}", target.path())));
        }

        debug!("Wrote {} bytes to {} (blob {})", size, target.path(), blob_id);

        self.tree
            .get_by_id(id)
            .await?
            .map(FileId::new)
            .ok_or_else(|| DriveError::NotFound(format!("record {}", target.path())))
    }

    /// Direct children of `parent`, in no particular order.
    pub async fn list(&self, parent: &FileId) -> Result<Vec<FileInfo>> {
        let children = self.tree.list_children(parent.record().id).await?;
        Ok(children.into_iter().map(FileInfo::new).collect())
    }

    /// Records anywhere in the partition whose name contains `substring`.
    ///
    /// `scope` is not used to narrow the result.
    pub async fn search(&self, scope: &FileId, substring: &str) -> Result<Vec<FileInfo>> {
        debug!("Searching {:?} from {}", substring, scope.path());
        let found = self.tree.search_by_name(substring).await?;
        Ok(found.into_iter().map(FileInfo::new).collect())
    }

    /// Info projection of `target`.
    pub fn info(&self, target: &FileId) -> FileInfo {
        FileInfo::new(target.record().clone())
    }

    /// Total bytes stored in the partition.
    pub async fn stats(&self) -> Result<DriveStats> {
        let (used_bytes, reserved) = self.tree.stats().await?;
        Ok(DriveStats {
            used_bytes,
            reserved,
        })
    }

    fn require_folder(target: &FileId) -> Result<()> {
        if !target.exists() {
            return Err(DriveError::NotFound(format!("folder {}", target.path())));
        }
        if !target.is_folder() {
            return Err(DriveError::Validation(format!(
                "{} is not a folder",
                target.path()
            )));
        }
        Ok(())
    }

    /// Checks shared by copy and move.
    fn require_movable(source: &FileId, target: &FileId, verb: &str) -> Result<()> {
        if !source.exists() {
            return Err(DriveError::NotFound(format!("record {}", source.path())));
        }
        if source.is_root() {
            return Err(DriveError::Validation(format!(
                "cannot {verb} the root folder"
            )));
        }
        Self::require_folder(target)?;
        if source == target || source.contains(target) {
            return Err(DriveError::Validation(format!(
                "cannot {verb} {} into itself",
                source.path()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    async fn setup_drive() -> (TempDir, Database, DbDrive) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let content = ContentStore::new(temp_dir.path()).unwrap();
        let drive = DbDrive::new(&db, Relation::new("files").unwrap(), 1, content)
            .await
            .unwrap();
        (temp_dir, db, drive)
    }

    async fn read_string(drive: &DbDrive, file: &FileId) -> String {
        let mut reader = drive.read(file).await.unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).await.unwrap();
        text
    }

    #[tokio::test]
    async fn test_new_rejects_bad_tree_id() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let content = ContentStore::new(temp_dir.path()).unwrap();

        let result = DbDrive::new(&db, Relation::new("files").unwrap(), 0, content).await;
        assert!(matches!(result, Err(DriveError::Validation(_))));
    }

    #[tokio::test]
    async fn test_root() {
        let (_tmp, _db, drive) = setup_drive().await;

        let root = drive.root();
        assert_eq!(root.path(), "/");
        assert!(root.is_folder());
        assert_eq!(root.record().parent_id, root.record().id);
        assert_eq!(root.record().tree_id, drive.tree_id());
        assert_eq!(drive.to_file_id("/").await, root);
    }

    #[tokio::test]
    async fn test_make_file_and_folder() {
        let (_tmp, _db, drive) = setup_drive().await;

        let docs = drive.make(&drive.root(), "docs", true).await.unwrap();
        assert_eq!(docs.path(), "/docs");
        assert!(docs.is_folder());

        let file = drive.make(&docs, "a.txt", false).await.unwrap();
        assert_eq!(file.path(), "/docs/a.txt");
        assert!(!file.is_folder());
        assert_eq!(file.record().size, 0);
        assert_eq!(file.record().parent_id, docs.record().id);
    }

    #[tokio::test]
    async fn test_make_duplicate_fails_with_store_error() {
        let (_tmp, _db, drive) = setup_drive().await;
        drive.make(&drive.root(), "a", false).await.unwrap();

        let result = drive.make(&drive.root(), "a", true).await;
        assert!(matches!(result, Err(DriveError::Store(_))));
    }

    #[tokio::test]
    async fn test_make_rejects_bad_parent_and_name() {
        let (_tmp, _db, drive) = setup_drive().await;
        let file = drive.make(&drive.root(), "a", false).await.unwrap();

        assert!(matches!(
            drive.make(&file, "b", false).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.make(&drive.root(), "x/y", false).await,
            Err(DriveError::Validation(_))
        ));
        let missing = drive.to_file_id("/missing").await;
        assert!(matches!(
            drive.make(&missing, "b", false).await,
            Err(DriveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_to_file_id_soft_fails() {
        let (_tmp, _db, drive) = setup_drive().await;

        let missing = drive.to_file_id("/nope").await;
        assert!(!missing.exists());
        assert_eq!(missing.path(), "");

        drive.make(&drive.root(), "docs", true).await.unwrap();
        assert!(drive.to_file_id("/docs/").await.exists());
        assert!(drive.to_file_id("docs").await.exists());
    }

    #[tokio::test]
    async fn test_get_parent() {
        let (_tmp, _db, drive) = setup_drive().await;
        let docs = drive.make(&drive.root(), "docs", true).await.unwrap();
        let file = drive.make(&docs, "a.txt", false).await.unwrap();

        assert_eq!(drive.get_parent(&file).await, docs);
        assert_eq!(drive.get_parent(&docs).await, drive.root());
        assert_eq!(drive.get_parent(&drive.root()).await, drive.root());

        let zero = drive.to_file_id("/nope").await;
        assert_eq!(drive.get_parent(&zero).await, drive.root());
    }

    #[tokio::test]
    async fn test_get_parent_of_orphan_is_root() {
        let (_tmp, _db, drive) = setup_drive().await;
        let docs = drive.make(&drive.root(), "docs", true).await.unwrap();
        let file = drive.make(&docs, "a.txt", false).await.unwrap();

        drive.tree.delete_by_id(docs.record().id).await.unwrap();

        assert_eq!(drive.get_parent(&file).await, drive.root());
    }

    #[tokio::test]
    async fn test_exists() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();

        assert!(!drive.exists(&root, "x").await);
        let x = drive.make(&root, "x", false).await.unwrap();
        assert!(drive.exists(&root, "x").await);

        drive.remove(&x).await.unwrap();
        assert!(!drive.exists(&root, "x").await);
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_tmp, _db, drive) = setup_drive().await;
        let file = drive.make(&drive.root(), "a.txt", false).await.unwrap();

        let file = drive.write(&file, &mut &b"hello"[..]).await.unwrap();

        assert_eq!(file.record().size, 5);
        assert!(file.record().has_content());
        assert_eq!(read_string(&drive, &file).await, "hello");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_blob() {
        let (tmp, _db, drive) = setup_drive().await;
        let file = drive.make(&drive.root(), "a.txt", false).await.unwrap();

        let first = drive.write(&file, &mut &b"first"[..]).await.unwrap();
        let second = drive.write(&first, &mut &b"second!"[..]).await.unwrap();

        assert_ne!(first.record().content_ref, second.record().content_ref);
        assert_eq!(read_string(&drive, &second).await, "second!");
        // The old blob is abandoned, not deleted.
        assert!(tmp.path().join(&first.record().content_ref).exists());
        assert_eq!(drive.stats().await.unwrap().used_bytes, 7);
    }

    #[tokio::test]
    async fn test_read_rejects_folder_and_empty_file() {
        let (_tmp, _db, drive) = setup_drive().await;
        let docs = drive.make(&drive.root(), "docs", true).await.unwrap();
        let empty = drive.make(&docs, "empty", false).await.unwrap();

        assert!(matches!(
            drive.read(&docs).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.read(&empty).await,
            Err(DriveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_rejects_folder_and_missing() {
        let (_tmp, _db, drive) = setup_drive().await;
        let docs = drive.make(&drive.root(), "docs", true).await.unwrap();

        assert!(matches!(
            drive.write(&docs, &mut &b"x"[..]).await,
            Err(DriveError::Validation(_))
        ));

        let missing = drive.to_file_id("/missing").await;
        assert!(matches!(
            drive.write(&missing, &mut &b"x"[..]).await,
            Err(DriveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_to_removed_record() {
        let (_tmp, _db, drive) = setup_drive().await;
        let file = drive.make(&drive.root(), "a.txt", false).await.unwrap();
        drive.remove(&file).await.unwrap();

        let result = drive.write(&file, &mut &b"late"[..]).await;
        assert!(matches!(result, Err(DriveError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_copy_file_shares_blob() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let file = drive.make(&root, "a.txt", false).await.unwrap();
        let file = drive.write(&file, &mut &b"hello"[..]).await.unwrap();
        let dst = drive.make(&root, "dst", true).await.unwrap();

        let copy = drive.copy(&file, &dst, "b.txt", false).await.unwrap();

        assert_eq!(copy.path(), "/dst/b.txt");
        assert_ne!(copy.record().id, file.record().id);
        assert_eq!(copy.record().content_ref, file.record().content_ref);
        assert_eq!(copy.record().parent_id, dst.record().id);
        assert_eq!(read_string(&drive, &copy).await, "hello");
    }

    #[tokio::test]
    async fn test_copy_folder_recursively() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let src = drive.make(&root, "src", true).await.unwrap();
        let sub = drive.make(&src, "sub", true).await.unwrap();
        let deep = drive.make(&sub, "deep.txt", false).await.unwrap();
        drive.write(&deep, &mut &b"deep"[..]).await.unwrap();
        drive.make(&src, "top.txt", false).await.unwrap();

        let copy = drive.copy(&src, &root, "copy", true).await.unwrap();
        assert_eq!(copy.path(), "/copy");

        let deep_copy = drive.to_file_id("/copy/sub/deep.txt").await;
        assert!(deep_copy.exists());
        assert_eq!(deep_copy.record().size, 4);
        assert_eq!(read_string(&drive, &deep_copy).await, "deep");

        let sub_copy = drive.to_file_id("/copy/sub").await;
        assert_eq!(drive.get_parent(&deep_copy).await, sub_copy);
        assert_eq!(drive.get_parent(&sub_copy).await, copy);
        assert!(drive.to_file_id("/copy/top.txt").await.exists());

        assert_eq!(drive.list(&src).await.unwrap().len(), 2);
        assert_eq!(drive.list(&copy).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_copy_validation() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let src = drive.make(&root, "src", true).await.unwrap();
        let inner = drive.make(&src, "inner", true).await.unwrap();
        let file = drive.make(&root, "f", false).await.unwrap();

        assert!(matches!(
            drive.copy(&src, &inner, "loop", true).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.copy(&src, &src, "loop", true).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.copy(&src, &root, "x", false).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.copy(&src, &file, "x", true).await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.copy(&root, &src, "x", true).await,
            Err(DriveError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_copy_onto_existing_name_fails() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let file = drive.make(&root, "a", false).await.unwrap();
        drive.make(&root, "b", false).await.unwrap();

        let result = drive.copy(&file, &root, "b", false).await;
        assert!(matches!(result, Err(DriveError::Store(_))));
    }

    #[tokio::test]
    async fn test_move_rename_in_place() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let file = drive.make(&root, "a", false).await.unwrap();

        let moved = drive.move_to(&file, &root, "b").await.unwrap();

        assert_eq!(moved.path(), "/b");
        assert_eq!(moved.record().id, file.record().id);
        assert!(!drive.to_file_id("/a").await.exists());
    }

    #[tokio::test]
    async fn test_move_folder_rewrites_descendants() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let a = drive.make(&root, "a", true).await.unwrap();
        let b = drive.make(&a, "b", true).await.unwrap();
        let c = drive.make(&b, "c.txt", false).await.unwrap();
        let c = drive.write(&c, &mut &b"data"[..]).await.unwrap();
        let dst = drive.make(&root, "dst", true).await.unwrap();
        let bystander = drive.make(&root, "ab", false).await.unwrap();

        let moved = drive.move_to(&a, &dst, "renamed").await.unwrap();

        assert_eq!(moved.path(), "/dst/renamed");
        assert_eq!(drive.get_parent(&moved).await, dst);

        let c_moved = drive.to_file_id("/dst/renamed/b/c.txt").await;
        assert_eq!(c_moved.record().id, c.record().id);
        assert_eq!(c_moved.record().content_ref, c.record().content_ref);
        assert_eq!(c_moved.record().parent_id, b.record().id);
        assert!(!drive.to_file_id("/a/b/c.txt").await.exists());

        let untouched = drive.to_file_id("/ab").await;
        assert_eq!(untouched.record(), bystander.record());
    }

    #[tokio::test]
    async fn test_move_validation() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let a = drive.make(&root, "a", true).await.unwrap();
        let inner = drive.make(&a, "inner", true).await.unwrap();

        assert!(matches!(
            drive.move_to(&a, &inner, "a").await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            drive.move_to(&root, &a, "r").await,
            Err(DriveError::Validation(_))
        ));
        let missing = drive.to_file_id("/missing").await;
        assert!(matches!(
            drive.move_to(&missing, &root, "m").await,
            Err(DriveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_folder_with_boundary() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let a = drive.make(&root, "a", true).await.unwrap();
        drive.make(&a, "x", false).await.unwrap();
        let ab = drive.make(&root, "ab", true).await.unwrap();
        drive.make(&ab, "y", false).await.unwrap();

        drive.remove(&a).await.unwrap();

        assert!(!drive.to_file_id("/a").await.exists());
        assert!(!drive.to_file_id("/a/x").await.exists());
        assert!(drive.to_file_id("/ab").await.exists());
        assert!(drive.to_file_id("/ab/y").await.exists());
    }

    #[tokio::test]
    async fn test_remove_root_and_missing() {
        let (_tmp, _db, drive) = setup_drive().await;

        assert!(matches!(
            drive.remove(&drive.root()).await,
            Err(DriveError::Validation(_))
        ));
        let missing = drive.to_file_id("/missing").await;
        assert!(matches!(
            drive.remove(&missing).await,
            Err(DriveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_ignores_scope() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let docs = drive.make(&root, "docs", true).await.unwrap();
        let other = drive.make(&root, "other", true).await.unwrap();
        drive.make(&docs, "note-1", false).await.unwrap();
        drive.make(&other, "note-2", false).await.unwrap();

        let mut found: Vec<String> = drive
            .search(&docs, "note")
            .await
            .unwrap()
            .into_iter()
            .map(|info| info.path().to_string())
            .collect();
        found.sort();

        assert_eq!(found, vec!["/docs/note-1", "/other/note-2"]);
    }

    #[tokio::test]
    async fn test_info_and_list() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let docs = drive.make(&root, "docs", true).await.unwrap();
        drive.make(&docs, "a", false).await.unwrap();

        let mut info = drive.info(&docs);
        assert!(info.is_dir());
        assert!(info.children().is_none());

        info.set_children(drive.list(&docs).await.unwrap());
        let children = info.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), "/docs/a");
    }

    #[tokio::test]
    async fn test_stats_tracks_size_delta() {
        let (_tmp, _db, drive) = setup_drive().await;
        let root = drive.root();
        let a = drive.make(&root, "a", false).await.unwrap();
        let b = drive.make(&root, "b", false).await.unwrap();

        assert_eq!(drive.stats().await.unwrap(), DriveStats::default());

        drive.write(&a, &mut &b"12345"[..]).await.unwrap();
        drive.write(&b, &mut &b"123"[..]).await.unwrap();
        assert_eq!(drive.stats().await.unwrap().used_bytes, 8);

        drive.write(&a, &mut &b"1"[..]).await.unwrap();
        let stats = drive.stats().await.unwrap();
        assert_eq!(stats.used_bytes, 4);
        assert_eq!(stats.reserved, 0);
    }

    #[tokio::test]
    async fn test_comply_is_permissive() {
        let (_tmp, _db, drive) = setup_drive().await;
        assert!(drive.comply(&drive.root(), Operation::Remove));
        assert!(drive.comply(&drive.root(), Operation::Write));
    }
}
