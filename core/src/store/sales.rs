use super::{coerce_date_part, coerce_f64, coerce_i64, AnalysisStore};
use crate::{aggregate::SalesTransaction, error::AnalysisResult};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, types::Value};

impl AnalysisStore {
    // ── Sales ledger ──────────────────────────────────────────────

    pub fn insert_sales_transaction(&self, row: &SalesTransaction) -> AnalysisResult<()> {
        let (year, month, day) = match row.sale_date {
            Some(d) => (
                Some(d.year() as i64),
                Some(d.month() as i64),
                Some(d.day() as i64),
            ),
            None => (None, None, None),
        };
        self.conn.execute(
            "INSERT INTO sales_transaction (
                finance_id, customer_name, product_name, amount, quantity,
                sale_year, sale_month, sale_day
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &row.finance_id,
                &row.customer_name,
                &row.product_name,
                row.amount,
                row.quantity,
                year,
                month,
                day
            ],
        )?;
        Ok(())
    }

    /// Load the whole sales ledger in insertion order, coercing dirty
    /// numeric cells and reassembling the decomposed sale date.
    pub fn load_sales_transactions(&self) -> AnalysisResult<Vec<SalesTransaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT finance_id, customer_name, product_name, amount, quantity,
                    sale_year, sale_month, sale_day
             FROM sales_transaction ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let amount = coerce_f64(row.get::<_, Value>(3)?);
            let quantity = coerce_i64(row.get::<_, Value>(4)?);
            let sale_date = date_from_parts(
                coerce_date_part(row.get::<_, Value>(5)?),
                coerce_date_part(row.get::<_, Value>(6)?),
                coerce_date_part(row.get::<_, Value>(7)?),
            );
            Ok(SalesTransaction {
                finance_id: row.get(0)?,
                customer_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                product_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                amount,
                quantity,
                sale_date,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn sales_transaction_count(&self) -> AnalysisResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM sales_transaction", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

/// Invalid or partial year/month/day parts yield no date.
fn date_from_parts(year: Option<i64>, month: Option<i64>, day: Option<i64>) -> Option<NaiveDate> {
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => {
            NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)
        }
        _ => None,
    }
}
