//! Usage ledger repository — per-account, per-day, per-operation
//! aggregates in the `usage_records` table.
//!
//! All increments go through a single `INSERT ... ON CONFLICT DO UPDATE`
//! statement, so concurrent scans for the same account never lose an
//! update. Rows are never deleted; the ledger is the billing history.

use rusqlite::params;
use serde::Serialize;

use super::{Database, DatabaseError};

/// A usage aggregate row. Monotonically non-decreasing within a day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRow {
    pub account_id: String,
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub operation: String,
    pub request_count: i64,
    pub token_count: i64,
    pub cost_usd: f64,
}

/// Records one billed AI call: +1 request, plus tokens and cost.
pub fn record(
    db: &Database,
    account_id: &str,
    date: &str,
    operation: &str,
    tokens: i64,
    cost_usd: f64,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO usage_records (account_id, date, operation, request_count, token_count, cost_usd)
             VALUES (?1, ?2, ?3, 1, ?4, ?5)
             ON CONFLICT(account_id, date, operation) DO UPDATE SET
               request_count = request_count + 1,
               token_count = token_count + ?4,
               cost_usd = cost_usd + ?5",
            params![account_id, date, operation, tokens, cost_usd],
        )?;
        Ok(())
    })
}

/// Finds one aggregate row, if any usage was recorded.
pub fn find(
    db: &Database,
    account_id: &str,
    date: &str,
    operation: &str,
) -> Result<Option<UsageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT account_id, date, operation, request_count, token_count, cost_usd
             FROM usage_records WHERE account_id = ?1 AND date = ?2 AND operation = ?3",
        )?;
        let mut rows = stmt.query_map(params![account_id, date, operation], map_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// All operations recorded for an account on one day.
pub fn usage_for_day(
    db: &Database,
    account_id: &str,
    date: &str,
) -> Result<Vec<UsageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT account_id, date, operation, request_count, token_count, cost_usd
             FROM usage_records WHERE account_id = ?1 AND date = ?2
             ORDER BY operation",
        )?;
        let rows = stmt.query_map(params![account_id, date], map_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::Sqlite)
    })
}

/// Recent usage rows for an account, newest day first. For dashboards.
pub fn usage_history(
    db: &Database,
    account_id: &str,
    limit: u32,
) -> Result<Vec<UsageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT account_id, date, operation, request_count, token_count, cost_usd
             FROM usage_records WHERE account_id = ?1
             ORDER BY date DESC, operation LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![account_id, limit], map_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::Sqlite)
    })
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UsageRow> {
    Ok(UsageRow {
        account_id: row.get(0)?,
        date: row.get(1)?,
        operation: row.get(2)?,
        request_count: row.get(3)?,
        token_count: row.get(4)?,
        cost_usd: row.get(5)?,
    })
}
