//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use repotrack_core::domain::{Repository, User};

/// Column offset of the joined owner in repository queries.
const OWNER_OFFSET: usize = 7;

/// Convert a SQLite row to a User.
///
/// Expected columns: id, name, email, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    user_at(row, 0)
}

fn user_at(row: &Row, offset: usize) -> rusqlite::Result<User> {
    let id: u64 = row.get(offset)?;
    let name: String = row.get(offset + 1)?;
    let email: String = row.get(offset + 2)?;
    let created_at: String = row.get(offset + 3)?;
    let updated_at: String = row.get(offset + 4)?;

    Ok(User {
        id,
        name,
        email,
        created_at: parse_datetime(offset + 3, &created_at)?,
        updated_at: parse_datetime(offset + 4, &updated_at)?,
    })
}

/// Convert a joined SQLite row to a Repository with its owner snapshot.
///
/// Expected columns: id, name, user_id, url, ai_enabled, created_at,
/// updated_at, then the owner's user columns (all NULL for an orphan).
pub fn row_to_repository(row: &Row) -> rusqlite::Result<Repository> {
    let id: u64 = row.get(0)?;
    let name: String = row.get(1)?;
    let user_id: Option<u64> = row.get(2)?;
    let url: String = row.get(3)?;
    let ai_enabled: bool = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    let owner_id: Option<u64> = row.get(OWNER_OFFSET)?;
    let owner = match owner_id {
        Some(_) => Some(user_at(row, OWNER_OFFSET)?),
        None => None,
    };

    Ok(Repository {
        id,
        name,
        user_id,
        owner,
        url,
        ai_enabled,
        created_at: parse_datetime(5, &created_at)?,
        updated_at: parse_datetime(6, &updated_at)?,
    })
}

/// Parse an RFC 3339 timestamp stored in column `idx`.
fn parse_datetime(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
