//! Tree store: file records of one partition in one relation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::record::{descendant_prefix, FileKind, FileRecord, NewRecord, ROOT_PATH};
use crate::db::Relation;
use crate::{DriveError, Result};

const COLUMNS: &str = "id, name, type, path, content, size, modified, folder, tree";

/// Statement text for one relation, composed once at construction.
#[derive(Debug, Clone)]
struct Statements {
    select_by_id: String,
    select_by_path: String,
    select_by_parent_and_name: String,
    select_children: String,
    select_by_name: String,
    select_by_prefix: String,
    insert: String,
    insert_root: String,
    adopt_root: String,
    update_content: String,
    update_location: String,
    update_path: String,
    delete_by_id: String,
    delete_by_prefix: String,
    sum_size: String,
}

impl Statements {
    fn new(relation: &Relation) -> Self {
        let r = relation.as_str();
        // `id <> folder` keeps the root row (its own parent) out of child queries.
        Self {
            select_by_id: format!("SELECT {COLUMNS} FROM {r} WHERE id = ? AND tree = ?"),
            select_by_path: format!("SELECT {COLUMNS} FROM {r} WHERE tree = ? AND path = ?"),
            select_by_parent_and_name: format!(
                "SELECT {COLUMNS} FROM {r} WHERE tree = ? AND folder = ? AND name = ? AND id <> folder"
            ),
            select_children: format!(
                "SELECT {COLUMNS} FROM {r} WHERE tree = ? AND folder = ? AND id <> folder"
            ),
            select_by_name: format!(
                "SELECT {COLUMNS} FROM {r} WHERE tree = ? AND path <> '/' AND instr(name, ?) > 0"
            ),
            select_by_prefix: format!(
                "SELECT {COLUMNS} FROM {r} WHERE tree = ? AND path <> '/' AND substr(path, 1, length(?)) = ?"
            ),
            insert: format!(
                "INSERT INTO {r} (name, type, path, content, size, modified, folder, tree)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            insert_root: format!(
                "INSERT OR IGNORE INTO {r} (name, type, path, content, size, modified, folder, tree)
                 VALUES ('', ?, '/', '', 0, ?, 0, ?)"
            ),
            adopt_root: format!(
                "UPDATE {r} SET folder = id WHERE tree = ? AND path = '/' AND folder <> id"
            ),
            update_content: format!(
                "UPDATE {r} SET size = ?, content = ?, modified = ? WHERE id = ? AND tree = ?"
            ),
            update_location: format!(
                "UPDATE {r} SET name = ?, folder = ?, path = ? WHERE id = ? AND tree = ?"
            ),
            update_path: format!("UPDATE {r} SET path = ? WHERE id = ? AND tree = ?"),
            delete_by_id: format!("DELETE FROM {r} WHERE id = ? AND tree = ?"),
            delete_by_prefix: format!(
                "DELETE FROM {r} WHERE tree = ? AND path <> '/' AND substr(path, 1, length(?)) = ?"
            ),
            sum_size: format!("SELECT COALESCE(SUM(size), 0) FROM {r} WHERE tree = ?"),
        }
    }
}

/// Repository for the records of one tree partition.
///
/// Every statement is scoped by the tree id bound at construction.
#[derive(Debug, Clone)]
pub struct TreeRepository {
    pool: SqlitePool,
    relation: Relation,
    tree_id: i64,
    sql: Statements,
}

impl TreeRepository {
    /// Create a repository over `relation`, restricted to partition `tree_id`.
    pub fn new(pool: SqlitePool, relation: Relation, tree_id: i64) -> Self {
        let sql = Statements::new(&relation);
        Self {
            pool,
            relation,
            tree_id,
            sql,
        }
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn tree_id(&self) -> i64 {
        self.tree_id
    }

    /// Make sure the partition has a stored root row and return it.
    ///
    /// The root gets a store-assigned id and is its own parent. Seeding is
    /// idempotent, so every drive sharing the partition may call it.
    pub async fn ensure_root(&self) -> Result<FileRecord> {
        let mut tx = self.pool.begin().await?;

        let seeded = sqlx::query(&self.sql.insert_root)
            .bind(FileKind::Folder.as_i64())
            .bind(Utc::now())
            .bind(self.tree_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(&self.sql.adopt_root)
            .bind(self.tree_id)
            .execute(&mut *tx)
            .await?;

        let root = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_path)
            .bind(self.tree_id)
            .bind(ROOT_PATH)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                DriveError::Store(format!("root of tree {} could not be seeded", self.tree_id))
            })?;

        tx.commit().await?;

        if seeded > 0 {
            debug!("Seeded root {} of tree {}", root.id, self.tree_id);
        }
        Ok(root)
    }

    /// Get a record by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_id)
            .bind(id)
            .bind(self.tree_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Get a record by path.
    ///
    /// `/` resolves to a synthetic root when the partition has no root row.
    pub async fn get_by_path(&self, path: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_path)
            .bind(self.tree_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        if record.is_none() && path == ROOT_PATH {
            return Ok(Some(FileRecord::synthetic_root(self.tree_id)));
        }

        Ok(record)
    }

    /// Get the child of `parent_id` named `name`.
    pub async fn get_by_parent_and_name(
        &self,
        parent_id: i64,
        name: &str,
    ) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_parent_and_name)
            .bind(self.tree_id)
            .bind(parent_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// List direct children of a folder, in no particular order.
    pub async fn list_children(&self, parent_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&self.sql.select_children)
            .bind(self.tree_id)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Every record of the partition whose name contains `pattern` literally.
    pub async fn search_by_name(&self, pattern: &str) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_name)
            .bind(self.tree_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Every descendant of the record at `path`.
    pub async fn list_by_path_prefix(&self, path: &str) -> Result<Vec<FileRecord>> {
        let prefix = descendant_prefix(path);
        let records = sqlx::query_as::<_, FileRecord>(&self.sql.select_by_prefix)
            .bind(self.tree_id)
            .bind(&prefix)
            .bind(&prefix)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Insert a record and return it with its assigned id.
    pub async fn insert(&self, record: &NewRecord) -> Result<FileRecord> {
        let result = sqlx::query(&self.sql.insert)
            .bind(&record.name)
            .bind(record.kind.as_i64())
            .bind(&record.path)
            .bind(&record.content_ref)
            .bind(record.size)
            .bind(record.modified_at)
            .bind(record.parent_id)
            .bind(self.tree_id)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted record {} at {}", id, record.path);

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DriveError::NotFound(format!("record {id}")))
    }

    /// Replace the content columns of a record.
    ///
    /// Returns `false` if no record with that id exists.
    pub async fn update_content(
        &self,
        id: i64,
        size: i64,
        content_ref: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(&self.sql.update_content)
            .bind(size)
            .bind(content_ref)
            .bind(modified_at)
            .bind(id)
            .bind(self.tree_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the name, parent and path of a record.
    pub async fn update_location(
        &self,
        id: i64,
        name: &str,
        parent_id: i64,
        path: &str,
    ) -> Result<bool> {
        let result = sqlx::query(&self.sql.update_location)
            .bind(name)
            .bind(parent_id)
            .bind(path)
            .bind(id)
            .bind(self.tree_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrite only the path of a record.
    pub async fn update_path(&self, id: i64, path: &str) -> Result<bool> {
        let result = sqlx::query(&self.sql.update_path)
            .bind(path)
            .bind(id)
            .bind(self.tree_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a record by id.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&self.sql.delete_by_id)
            .bind(id)
            .bind(self.tree_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every record whose path starts with `prefix + "/"`.
    ///
    /// Returns the number of deleted records.
    pub async fn delete_by_path_prefix(&self, prefix: &str) -> Result<u64> {
        let prefix = descendant_prefix(prefix);
        let result = sqlx::query(&self.sql.delete_by_prefix)
            .bind(self.tree_id)
            .bind(&prefix)
            .bind(&prefix)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Total stored size of the partition and the reserved count axis (always 0).
    pub async fn stats(&self) -> Result<(u64, u64)> {
        let total: (i64,) = sqlx::query_as(&self.sql.sum_size)
            .bind(self.tree_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((total.0.max(0) as u64, 0))
    }
}
