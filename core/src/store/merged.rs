use super::AnalysisStore;
use crate::{error::AnalysisResult, merge::MergedRecord};
use rusqlite::params;

impl AnalysisStore {
    // ── Merged output table ───────────────────────────────────────

    /// Replace the merged table wholesale with this run's records.
    /// Derived fields are never mutated in place.
    pub fn replace_merged_records(&self, records: &[MergedRecord]) -> AnalysisResult<()> {
        self.conn.execute("DELETE FROM merged_record", [])?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO merged_record (
                finance_id, customer_name, department, match_type,
                total_amount, total_quantity, unique_product_count, transaction_count,
                last_sale_date, days_since_last_sale, activity_tier,
                debt_2023, debt_2024, debt_2025, debt_trend,
                debt_to_sales_ratio, customer_tier, risk_score, risk_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                      ?14, ?15, ?16, ?17, ?18, ?19)",
        )?;
        for rec in records {
            stmt.execute(params![
                &rec.finance_id,
                &rec.customer_name,
                &rec.department,
                rec.match_type.as_str(),
                rec.total_amount,
                rec.total_quantity,
                rec.unique_product_count,
                rec.transaction_count,
                rec.last_sale_date.map(|d| d.to_string()),
                rec.days_since_last_sale,
                rec.activity_tier.as_str(),
                rec.debt_2023,
                rec.debt_2024,
                rec.debt_2025,
                &rec.debt_trend,
                rec.debt_to_sales_ratio,
                rec.customer_tier.as_str(),
                rec.risk_score,
                rec.risk_level.as_str()
            ])?;
        }
        Ok(())
    }

    pub fn merged_record_count(&self) -> AnalysisResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM merged_record", [], |row| row.get(0))?;
        Ok(count)
    }

    /// (match_type, row count) pairs, most frequent first.
    pub fn match_type_distribution(&self) -> AnalysisResult<Vec<(String, i64)>> {
        self.column_distribution("match_type")
    }

    /// (customer_tier, row count) pairs, most frequent first.
    pub fn tier_distribution(&self) -> AnalysisResult<Vec<(String, i64)>> {
        self.column_distribution("customer_tier")
    }

    /// (risk_level, row count) pairs, most frequent first.
    pub fn risk_level_distribution(&self) -> AnalysisResult<Vec<(String, i64)>> {
        self.column_distribution("risk_level")
    }

    fn column_distribution(&self, column: &str) -> AnalysisResult<Vec<(String, i64)>> {
        // Column names come from the three callers above, never from input.
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM merged_record
             GROUP BY {column} ORDER BY COUNT(*) DESC, {column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
