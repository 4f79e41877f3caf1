//! SQLite persistence layer: the reference implementation of the external
//! collaborator that supplies the two source tables and accepts the merged
//! output table.
//!
//! RULE: Only the store talks to the database. The engine and pipeline
//! call store methods and never execute SQL directly.
//!
//! Source ledgers are known to contain blanks and typos, so numeric
//! columns are read as dynamic values and coerced to defaults here, at the
//! boundary, instead of failing a whole analysis run.

use crate::error::AnalysisResult;
use rusqlite::types::Value;
use rusqlite::Connection;

mod debt;
mod merged;
mod sales;

pub struct AnalysisStore {
    conn: Connection,
}

impl AnalysisStore {
    pub fn open(path: &str) -> AnalysisResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalysisResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalysisResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

/// Coerce a dynamic SQLite value to a float; blanks and typos become 0.0.
pub(crate) fn coerce_f64(v: Value) -> f64 {
    match v {
        Value::Real(x) => x,
        Value::Integer(i) => i as f64,
        Value::Text(s) => s.trim().parse().unwrap_or(0.0),
        Value::Null | Value::Blob(_) => 0.0,
    }
}

/// Coerce a dynamic SQLite value to an integer; fractional text rounds
/// toward zero, junk becomes 0.
pub(crate) fn coerce_i64(v: Value) -> i64 {
    match v {
        Value::Integer(i) => i,
        Value::Real(x) => x as i64,
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .unwrap_or_else(|_| s.parse::<f64>().map(|x| x as i64).unwrap_or(0))
        }
        Value::Null | Value::Blob(_) => 0,
    }
}

/// Coerce a dynamic SQLite value to an optional year/month/day part.
pub(crate) fn coerce_date_part(v: Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(i),
        Value::Real(x) => Some(x as i64),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}
