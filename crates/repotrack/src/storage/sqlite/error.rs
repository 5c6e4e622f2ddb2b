//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `StoreError`.
//! Constraint failures become client errors, busy or closed connections
//! become `ConnectionFailed`.

use repotrack_core::storage::StoreError;

/// Maps a rusqlite error to a StoreError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_UNIQUE` → `StoreError::AlreadyExists`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `StoreError::InvalidData`
/// - Busy, locked or unopenable database → `StoreError::ConnectionFailed`
/// - No rows → `StoreError::NotFound`
/// - All other errors → `StoreError::QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, entity_type: &'static str, id: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::already_exists(entity_type, id)
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            StoreError::InvalidData(format!("{entity_type} references a missing user"))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StoreError::ConnectionFailed(err.to_string())
        }

        rusqlite::Error::QueryReturnedNoRows => StoreError::not_found(entity_type, id),

        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            StoreError::Serialization(err.to_string())
        }

        _ => StoreError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a StoreError.
///
/// `id` names the entity in `NotFound` and `AlreadyExists` errors.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl AsRef<str>,
) -> StoreError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id.as_ref())
        }
        tokio_rusqlite::Error::Close(_) | tokio_rusqlite::Error::ConnectionClosed => {
            StoreError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => StoreError::QueryFailed(err.to_string()),
    }
}
