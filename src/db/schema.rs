//! Database schema definitions for dbdrive.
//!
//! Each migration is a SQL template; `{relation}` is replaced with the
//! validated relation name before execution, so several drives can keep
//! their records in differently named relations of one database.

/// Placeholder substituted with the relation name.
pub const RELATION_PLACEHOLDER: &str = "{relation}";

/// Table tracking which migrations have been applied to which relation.
pub const SCHEMA_VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS drive_schema_version (
    relation    TEXT NOT NULL,
    version     INTEGER NOT NULL,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (relation, version)
)";

/// List of migrations to apply in order.
pub const MIGRATIONS: &[&str] = &[
    // v1: file records
    r#"
CREATE TABLE IF NOT EXISTS {relation} (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    type        INTEGER NOT NULL CHECK (type IN (1, 2)),
    path        TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    size        INTEGER NOT NULL DEFAULT 0,
    modified    TEXT NOT NULL,
    folder      INTEGER NOT NULL,
    tree        INTEGER NOT NULL,
    UNIQUE (tree, path)
);
"#,
    // v2: child listing and parent/name lookups
    r#"
CREATE INDEX IF NOT EXISTS idx_{relation}_folder ON {relation}(folder, name);
CREATE INDEX IF NOT EXISTS idx_{relation}_tree ON {relation}(tree);
"#,
];

/// Render a migration template for the given relation name.
pub fn render(template: &str, relation: &str) -> String {
    template.replace(RELATION_PLACEHOLDER, relation)
}
