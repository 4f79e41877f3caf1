//! Analysis orchestration: load the two ledgers, run the pure pipeline,
//! replace the merged output table.
//!
//! PIPELINE ORDER (fixed, never reordered):
//!   1. aggregate raw sales rows into one summary per customer
//!   2. resolve every debt row against the aggregate pool
//!   3. build the uniform merged records
//!   4. classify tier, risk score and risk level
//!
//! RULES:
//!   - `run_pipeline` is a pure function over in-memory snapshots; the
//!     engine only adds the store read/write path around it.
//!   - Everything is recomputed from scratch per invocation. The consumed
//!     set inside the matcher lives only for one invocation, so concurrent
//!     analyses over separate snapshots never share state.

use crate::{
    aggregate::{aggregate_sales, SalesTransaction},
    classify,
    config::AnalysisConfig,
    dataset,
    error::AnalysisResult,
    lookup::{CustomerDetail, CustomerLookup},
    matching::{DebtLedgerEntry, MatchingEngine},
    merge::{self, MergedRecord},
    standardize::NameStandardizer,
    store::AnalysisStore,
};
use chrono::NaiveDate;

pub struct AnalysisEngine {
    pub store: AnalysisStore,
    config: AnalysisConfig,
    as_of: NaiveDate,
}

impl AnalysisEngine {
    pub fn new(store: AnalysisStore, config: AnalysisConfig, as_of: NaiveDate) -> Self {
        Self {
            store,
            config,
            as_of,
        }
    }

    /// Build an engine over an in-memory store seeded with a synthetic
    /// dataset. Fixed anchor date keeps test runs reproducible.
    pub fn build_test(seed: u64, customers: usize) -> AnalysisResult<Self> {
        let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).expect("fixed fixture anchor date");
        let store = AnalysisStore::in_memory()?;
        store.migrate()?;

        let data = dataset::generate(seed, customers, as_of);
        for row in &data.sales {
            store.insert_sales_transaction(row)?;
        }
        for row in &data.debts {
            store.insert_debt_record(row)?;
        }

        Ok(Self::new(store, AnalysisConfig::default(), as_of))
    }

    /// Run one full analysis: snapshot both ledgers, run the pipeline,
    /// replace the merged table, return the classified records.
    pub fn run(&self) -> AnalysisResult<Vec<MergedRecord>> {
        let sales = self.store.load_sales_transactions()?;
        let debts = self.store.load_debt_records()?;

        let records = run_pipeline(&sales, &debts, self.as_of, &self.config);
        self.store.replace_merged_records(&records)?;

        log::info!(
            "analysis complete: {} sales rows, {} debt rows, {} merged records",
            sales.len(),
            debts.len(),
            records.len()
        );
        Ok(records)
    }

    /// Single-customer drill-down against the same two ledgers.
    pub fn customer_detail(&self, search_term: &str) -> AnalysisResult<CustomerDetail> {
        let sales = self.store.load_sales_transactions()?;
        let debts = self.store.load_debt_records()?;
        let lookup = CustomerLookup::new(&sales, &debts, &self.config);
        Ok(lookup.lookup(search_term, self.as_of))
    }
}

/// The full pipeline as a pure function. Given identical snapshots and
/// the same anchor date, the output is identical.
pub fn run_pipeline(
    sales: &[SalesTransaction],
    debts: &[DebtLedgerEntry],
    as_of: NaiveDate,
    config: &AnalysisConfig,
) -> Vec<MergedRecord> {
    let standardizer = NameStandardizer::new(&config.matching.known_prefixes);
    let aggregates = aggregate_sales(sales, as_of, &standardizer, &config.classifier);
    log::debug!(
        "aggregated {} sales rows into {} customer aggregates",
        sales.len(),
        aggregates.len()
    );

    let matcher = MatchingEngine::new(&config.matching);
    let result = matcher.resolve(debts, &aggregates);

    let mut records = merge::build_records(&result, debts, &aggregates);
    classify::apply(&mut records, &config.classifier);
    records
}
