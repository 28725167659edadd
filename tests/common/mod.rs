//! Test helpers for drive integration tests.

#![allow(dead_code)]

use dbdrive::{ContentStore, Database, DbDrive, FileId, Relation};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

/// A drive backed by an in-memory database and a temporary blob directory.
pub struct TestDrive {
    pub drive: DbDrive,
    pub db: Database,
    pub content_dir: TempDir,
}

impl TestDrive {
    /// Create a drive on tree 1 of relation `files`.
    pub async fn new() -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        Self::on(db, 1).await
    }

    /// Create a drive for `tree_id` on an existing database.
    pub async fn on(db: Database, tree_id: i64) -> Self {
        let content_dir = TempDir::new().expect("Failed to create content dir");
        let content = ContentStore::new(content_dir.path()).unwrap();
        let drive = DbDrive::new(&db, Relation::new("files").unwrap(), tree_id, content)
            .await
            .expect("Failed to create drive");

        Self {
            drive,
            db,
            content_dir,
        }
    }

    /// Resolve a path, panicking if it doesn't exist.
    pub async fn get(&self, path: &str) -> FileId {
        let file = self.drive.to_file_id(path).await;
        assert!(file.exists(), "expected {path} to exist");
        file
    }

    /// Whether a path resolves.
    pub async fn has(&self, path: &str) -> bool {
        self.drive.to_file_id(path).await.exists()
    }

    /// Create a file with the given content.
    pub async fn file(&self, parent: &FileId, name: &str, content: &[u8]) -> FileId {
        let file = self.drive.make(parent, name, false).await.unwrap();
        self.drive.write(&file, &mut &content[..]).await.unwrap()
    }

    /// Create a folder.
    pub async fn folder(&self, parent: &FileId, name: &str) -> FileId {
        self.drive.make(parent, name, true).await.unwrap()
    }

    /// Read the whole content of a file.
    pub async fn read(&self, file: &FileId) -> Vec<u8> {
        let mut reader = self.drive.read(file).await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        buf
    }

    /// Every path in the partition, sorted.
    pub async fn all_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .drive
            .search(&self.drive.root(), "")
            .await
            .unwrap()
            .into_iter()
            .map(|info| info.path().to_string())
            .collect();
        paths.sort();
        paths
    }
}
