//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
///
/// `foreign_keys` is a per-connection setting, so it is switched on here
/// together with the schema.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS repositories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    user_id INTEGER,
    url TEXT NOT NULL,
    ai_enabled INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_repositories_user_id ON repositories(user_id);
"#;

pub const PING: &str = "SELECT 1";

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (name, email, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_USERS: &str = r#"
SELECT id, name, email, created_at, updated_at
FROM users
ORDER BY id ASC
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, name, email, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET name = ?2, email = ?3, updated_at = ?4
WHERE id = ?1
"#;

pub const DELETE_USER: &str = r#"
DELETE FROM users
WHERE id = ?1
"#;

// Repository queries. Reads LEFT JOIN the owner so orphans stay visible.
pub const INSERT_REPOSITORY: &str = r#"
INSERT INTO repositories (name, user_id, url, ai_enabled, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_REPOSITORIES: &str = r#"
SELECT r.id, r.name, r.user_id, r.url, r.ai_enabled, r.created_at, r.updated_at,
       u.id, u.name, u.email, u.created_at, u.updated_at
FROM repositories r
LEFT JOIN users u ON u.id = r.user_id
ORDER BY r.id ASC
"#;

pub const SELECT_REPOSITORY_BY_ID: &str = r#"
SELECT r.id, r.name, r.user_id, r.url, r.ai_enabled, r.created_at, r.updated_at,
       u.id, u.name, u.email, u.created_at, u.updated_at
FROM repositories r
LEFT JOIN users u ON u.id = r.user_id
WHERE r.id = ?1
"#;

pub const UPDATE_REPOSITORY: &str = r#"
UPDATE repositories
SET name = ?2, user_id = ?3, url = ?4, ai_enabled = ?5, updated_at = ?6
WHERE id = ?1
"#;

pub const DELETE_REPOSITORY: &str = r#"
DELETE FROM repositories
WHERE id = ?1
"#;
