//! SQLite store implementation.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use repotrack_core::domain::{Repository, RepositoryDraft, User, UserDraft};
use repotrack_core::storage::{RepositoryStore, Result, StoreError, StoreHealth, UserStore};

use super::conversions::{format_datetime, row_to_repository, row_to_user};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Reads one row back, turning an empty result into `QueryReturnedNoRows`.
fn select_one<T>(
    conn: &rusqlite::Connection,
    sql: &str,
    id: u64,
    f: fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> tokio_rusqlite::Result<T> {
    conn.query_row(sql, [id], f).map_err(wrap_err)
}

/// SQLite-backed store for users and repositories.
///
/// All statements run on the single connection owned by `tokio-rusqlite`'s
/// background thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a file-based database and ensures the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a store over an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// UserStore implementation
// ============================================================================

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_all_users(&self) -> Result<Vec<User>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_USERS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_user).map_err(wrap_err)?;

                let mut users = Vec::new();
                for row_result in rows {
                    users.push(row_result.map_err(wrap_err)?);
                }
                Ok(users)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", "*"))
    }

    async fn get_user(&self, id: u64) -> Result<Option<User>> {
        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_USER_BY_ID, [id], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let name = draft.name.clone();
        let email = draft.email.clone();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_USER, params![name, email, now, now])
                    .map_err(wrap_err)?;
                let id = conn.last_insert_rowid() as u64;
                select_one(conn, schema::SELECT_USER_BY_ID, id, row_to_user)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", &draft.email))
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> Result<User> {
        let name = draft.name.clone();
        let email = draft.email.clone();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_USER, params![id, name, email, now])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                select_one(conn, schema::SELECT_USER_BY_ID, id, row_to_user)
            })
            .await
            .map_err(|e| match map_tokio_rusqlite_error(e, "User", id.to_string()) {
                // A unique violation here is always the email.
                StoreError::AlreadyExists { entity_type, .. } => {
                    StoreError::already_exists(entity_type, &draft.email)
                }
                other => other,
            })
    }

    async fn delete_user(&self, id: u64) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn.execute(schema::DELETE_USER, [id]).map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }
}

// ============================================================================
// RepositoryStore implementation
// ============================================================================

#[async_trait]
impl RepositoryStore for SqliteStore {
    async fn get_all_repositories(&self) -> Result<Vec<Repository>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_REPOSITORIES)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_repository).map_err(wrap_err)?;

                let mut repositories = Vec::new();
                for row_result in rows {
                    repositories.push(row_result.map_err(wrap_err)?);
                }
                Ok(repositories)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Repository", "*"))
    }

    async fn get_repository(&self, id: u64) -> Result<Option<Repository>> {
        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_REPOSITORY_BY_ID, [id], row_to_repository)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Repository", id.to_string()))
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<Repository> {
        let draft = draft.clone();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_REPOSITORY,
                    params![draft.name, draft.user_id, draft.url, draft.ai_enabled, now, now],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid() as u64;
                select_one(conn, schema::SELECT_REPOSITORY_BY_ID, id, row_to_repository)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Repository", "new"))
    }

    async fn update_repository(&self, id: u64, draft: &RepositoryDraft) -> Result<Repository> {
        let draft = draft.clone();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_REPOSITORY,
                        params![id, draft.name, draft.user_id, draft.url, draft.ai_enabled, now],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                select_one(conn, schema::SELECT_REPOSITORY_BY_ID, id, row_to_repository)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Repository", id.to_string()))
    }

    async fn delete_repository(&self, id: u64) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_REPOSITORY, [id])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Repository", id.to_string()))
    }
}

#[async_trait]
impl StoreHealth for SqliteStore {
    async fn ping(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.query_row(schema::PING, [], |row| row.get::<_, i64>(0))
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Database", "ping"))
    }
}
