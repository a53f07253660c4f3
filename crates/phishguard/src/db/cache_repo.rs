//! Verdict cache repository — fingerprint-keyed rows in the `scan_cache`
//! table with lazy TTL handling.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{Database, DatabaseError};

/// A raw cache row from the database.
#[derive(Debug, Clone)]
pub struct CacheRow {
    pub fingerprint: String,
    pub result_json: String,
    pub created_at: String,
    pub expires_at: String,
    pub hit_count: i64,
}

impl CacheRow {
    /// Checks whether the entry has passed its expiry at `now`.
    /// Unparseable timestamps are treated as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires) => expires <= now,
            Err(_) => true,
        }
    }
}

/// Inserts or replaces a cache entry, resetting its hit count.
pub fn upsert(db: &Database, row: &CacheRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO scan_cache (fingerprint, result_json, created_at, expires_at, hit_count)
             VALUES (?1, ?2, ?3, ?4, 0)
             ON CONFLICT(fingerprint) DO UPDATE SET
               result_json = ?2,
               created_at = ?3,
               expires_at = ?4,
               hit_count = 0",
            params![row.fingerprint, row.result_json, row.created_at, row.expires_at],
        )?;
        Ok(())
    })
}

/// Finds a live entry and increments its hit count.
///
/// An expired row is deleted on the way out and reported as absent
/// (lazy TTL check; the periodic sweep handles rows nobody reads).
pub fn find_live(
    db: &Database,
    fingerprint: &str,
    now: DateTime<Utc>,
) -> Result<Option<CacheRow>, DatabaseError> {
    let row = find(db, fingerprint)?;
    match row {
        Some(row) if row.is_expired(now) => {
            delete(db, fingerprint)?;
            Ok(None)
        }
        Some(row) => {
            db.with_conn(|conn| {
                conn.execute(
                    "UPDATE scan_cache SET hit_count = hit_count + 1 WHERE fingerprint = ?1",
                    params![fingerprint],
                )?;
                Ok(())
            })?;
            Ok(Some(row))
        }
        None => Ok(None),
    }
}

/// Finds an entry regardless of expiry.
pub fn find(db: &Database, fingerprint: &str) -> Result<Option<CacheRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT fingerprint, result_json, created_at, expires_at, hit_count
             FROM scan_cache WHERE fingerprint = ?1",
        )?;
        let mut rows = stmt.query_map(params![fingerprint], |row| {
            Ok(CacheRow {
                fingerprint: row.get(0)?,
                result_json: row.get(1)?,
                created_at: row.get(2)?,
                expires_at: row.get(3)?,
                hit_count: row.get(4)?,
            })
        })?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Deletes a single entry.
pub fn delete(db: &Database, fingerprint: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "DELETE FROM scan_cache WHERE fingerprint = ?1",
            params![fingerprint],
        )?;
        Ok(())
    })
}

/// Removes every entry expired at `now`. Returns the number deleted.
pub fn delete_expired(db: &Database, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let deleted = conn.execute(
            "DELETE FROM scan_cache WHERE expires_at <= ?1",
            params![now.to_rfc3339()],
        )?;
        Ok(deleted)
    })
}
