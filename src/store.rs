// 💾 Persistence adapter - SQLite-backed snapshots with optimistic locking
//
// One table. A persisted list is the full AppState as JSON plus a version
// counter that increments by exactly 1 on every successful update. The
// version is the concurrency token: updates are a compare-and-swap on
// (id, version) in a single UPDATE statement, so two writers racing on
// the same expected version can never both win.
//
// On conflict the caller must NOT retry with the reported actual version;
// that would silently overwrite the other writer. Surface it and make the
// human reload.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::list_id::{new_list_id, normalize_list_id};
use crate::state::AppState;

// ============================================================================
// ERRORS
// ============================================================================

/// Store failures as exhaustively matchable variants - calling code
/// branches on these, never on string contents.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with that id.
    #[error("list not found")]
    NotFound,

    /// Someone else updated the list first. Carries both sides so the
    /// caller can report exactly what happened.
    #[error("version conflict: expected {expected}, actual {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    /// A payload that does not have the required AppState shape.
    #[error("invalid list payload: {0}")]
    Validation(String),

    /// The database itself failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

// ============================================================================
// PERSISTED LIST
// ============================================================================

/// A stored snapshot: the full state plus versioning metadata.
/// Timestamps are milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedList {
    pub id: String,

    pub data: AppState,

    /// Starts at 1, increments by exactly 1 per successful update.
    pub version: i64,

    #[serde(rename = "createdAt")]
    pub created_at: i64,

    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

// ============================================================================
// DATABASE
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            version INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Store a new list. Generates the id, version starts at 1.
pub fn create_list(conn: &Connection, state: &AppState) -> Result<PersistedList, StoreError> {
    let id = new_list_id();
    let now = Utc::now().timestamp_millis();
    let data = serde_json::to_string(state)
        .map_err(|e| StoreError::Validation(e.to_string()))?;

    conn.execute(
        "INSERT INTO lists (id, data, version, created_at, updated_at)
         VALUES (?1, ?2, 1, ?3, ?3)",
        params![id, data, now],
    )?;

    Ok(PersistedList {
        id,
        data: state.clone(),
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

/// Fetch a list by id. Ids are matched case-insensitively; malformed ids
/// are indistinguishable from absent ones.
pub fn get_list(conn: &Connection, raw_id: &str) -> Result<PersistedList, StoreError> {
    let id = normalize_list_id(raw_id).ok_or(StoreError::NotFound)?;

    let row = conn
        .query_row(
            "SELECT data, version, created_at, updated_at FROM lists WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?
        .ok_or(StoreError::NotFound)?;

    let (data_json, version, created_at, updated_at) = row;
    let data: AppState = serde_json::from_str(&data_json)
        .map_err(|e| StoreError::Validation(format!("stored payload is not an AppState: {}", e)))?;

    Ok(PersistedList {
        id,
        data,
        version,
        created_at,
        updated_at,
    })
}

/// Version-checked update. Succeeds only when the stored version still
/// equals `expected_version`; the new version is exactly expected + 1.
///
/// The whole check-and-write is one UPDATE statement, so it is atomic
/// with respect to concurrent writers.
pub fn update_list(
    conn: &Connection,
    raw_id: &str,
    state: &AppState,
    expected_version: i64,
) -> Result<PersistedList, StoreError> {
    let id = normalize_list_id(raw_id).ok_or(StoreError::NotFound)?;
    let now = Utc::now().timestamp_millis();
    let data = serde_json::to_string(state)
        .map_err(|e| StoreError::Validation(e.to_string()))?;

    let changed = conn.execute(
        "UPDATE lists SET data = ?1, version = version + 1, updated_at = ?2
         WHERE id = ?3 AND version = ?4",
        params![data, now, id, expected_version],
    )?;

    if changed == 0 {
        // Distinguish a missing row from a stale version
        let actual: Option<i64> = conn
            .query_row(
                "SELECT version FROM lists WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        return match actual {
            None => Err(StoreError::NotFound),
            Some(actual) => Err(StoreError::VersionConflict {
                expected: expected_version,
                actual,
            }),
        };
    }

    let created_at: i64 = conn.query_row(
        "SELECT created_at FROM lists WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;

    Ok(PersistedList {
        id,
        data: state.clone(),
        version: expected_version + 1,
        created_at,
        updated_at: now,
    })
}

// ============================================================================
// TESTS
// ============================================================================
