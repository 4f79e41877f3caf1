use super::{coerce_f64, AnalysisStore};
use crate::{error::AnalysisResult, matching::DebtLedgerEntry};
use rusqlite::{params, types::Value};

impl AnalysisStore {
    // ── Debt ledger ───────────────────────────────────────────────

    pub fn insert_debt_record(&self, row: &DebtLedgerEntry) -> AnalysisResult<()> {
        self.conn.execute(
            "INSERT INTO debt_record (
                finance_id, customer_name, department,
                debt_2023, debt_2024, debt_2025, debt_trend
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &row.finance_id,
                &row.customer_name,
                &row.department,
                row.debt_2023,
                row.debt_2024,
                row.debt_2025,
                &row.debt_trend
            ],
        )?;
        Ok(())
    }

    /// Load the whole debt ledger in insertion order. Missing departments
    /// and trend labels substitute empty strings, never nulls.
    pub fn load_debt_records(&self) -> AnalysisResult<Vec<DebtLedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT finance_id, customer_name, department,
                    debt_2023, debt_2024, debt_2025, debt_trend
             FROM debt_record ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DebtLedgerEntry {
                finance_id: row.get(0)?,
                customer_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                department: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                debt_2023: coerce_f64(row.get::<_, Value>(3)?),
                debt_2024: coerce_f64(row.get::<_, Value>(4)?),
                debt_2025: coerce_f64(row.get::<_, Value>(5)?),
                debt_trend: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn debt_record_count(&self) -> AnalysisResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM debt_record", [], |row| row.get(0))?;
        Ok(count)
    }
}
