//! Verdict cache: a moka in-memory front over the SQLite `scan_cache`
//! table.
//!
//! The cache fails open: any storage error is logged and reported as a
//! miss, so a broken cache can slow scans down but never block them.

use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};

use crate::db::{cache_repo, Database};
use crate::fingerprint::Fingerprint;
use crate::request::ScanResult;

#[derive(Clone)]
pub struct CacheStore {
    db: Database,
    /// Fast path for fingerprints scanned recently by this process.
    /// Entries are only inserted on `put`, so the moka TTL clock starts
    /// together with the row's `expires_at` and cannot outlive it.
    front: moka::sync::Cache<String, ScanResult>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(db: Database, ttl: Duration) -> Self {
        let front = moka::sync::Cache::builder()
            .max_capacity(100_000)
            .time_to_live(ttl)
            .build();
        Self { db, front, ttl }
    }

    /// Looks up a live verdict. Increments the entry's hit count.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<ScanResult> {
        if let Some(result) = self.front.get(fingerprint.as_str()) {
            // Keep the persistent hit counter in step; best effort.
            if let Err(e) = self.touch(fingerprint) {
                debug!("Cache hit-count update failed: {}", e);
            }
            return Some(result);
        }

        match cache_repo::find_live(&self.db, fingerprint.as_str(), Utc::now()) {
            Ok(Some(row)) => match serde_json::from_str::<ScanResult>(&row.result_json) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Dropping undecodable cache entry {}: {}", fingerprint, e);
                    let _ = cache_repo::delete(&self.db, fingerprint.as_str());
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                // Fail open: a cache outage is a miss, never a blocked scan.
                warn!("Cache store unavailable, treating as miss: {}", e);
                None
            }
        }
    }

    /// Stores a verdict under the standard TTL. Write failures are
    /// logged and swallowed.
    pub fn put(&self, fingerprint: &Fingerprint, result: &ScanResult) {
        let created_at = Utc::now();
        let expires_at = created_at + chrono::Duration::from_std(self.ttl).unwrap_or_default();

        let result_json = match serde_json::to_string(result) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize scan result for cache: {}", e);
                return;
            }
        };

        let row = cache_repo::CacheRow {
            fingerprint: fingerprint.as_str().to_string(),
            result_json,
            created_at: created_at.to_rfc3339(),
            expires_at: expires_at.to_rfc3339(),
            hit_count: 0,
        };

        if let Err(e) = cache_repo::upsert(&self.db, &row) {
            warn!("Cache write failed for {}: {}", fingerprint, e);
        }
        self.front.insert(fingerprint.as_str().to_string(), result.clone());
    }

    /// Removes expired rows from the persistent store. Returns the
    /// number deleted. The moka front expires entries on its own.
    pub fn sweep_expired(&self) -> usize {
        match cache_repo::delete_expired(&self.db, Utc::now()) {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache sweep removed {} expired entries", deleted);
                }
                deleted
            }
            Err(e) => {
                warn!("Cache sweep failed: {}", e);
                0
            }
        }
    }

    /// How often a fingerprint has been served from cache.
    pub fn hit_count(&self, fingerprint: &Fingerprint) -> u64 {
        cache_repo::find(&self.db, fingerprint.as_str())
            .ok()
            .flatten()
            .map(|row| row.hit_count.max(0) as u64)
            .unwrap_or(0)
    }

    fn touch(&self, fingerprint: &Fingerprint) -> Result<(), crate::db::DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE scan_cache SET hit_count = hit_count + 1 WHERE fingerprint = ?1",
                rusqlite::params![fingerprint.as_str()],
            )?;
            Ok(())
        })
    }
}
