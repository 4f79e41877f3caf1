//! Single-customer drill-down: resolves a free-text search term to one or
//! more underlying customer identities and returns their full history.
//!
//! Resolution order:
//!   1. A term that looks like a pure identifier (digits and hyphens) is
//!      tried as an exact finance-id lookup against the sales ledger. Any
//!      hit short-circuits name resolution entirely.
//!   2. Otherwise every distinct customer name in either ledger is
//!      accepted on standardized equality, containment either way, or
//!      keyword overlap.
//!
//! The returned finance ids and customer names are the union found in the
//! retrieved rows, which can be broader than the accepted-name set when
//! one customer carries several aliases in the raw data.

use crate::{
    aggregate::SalesTransaction,
    config::AnalysisConfig,
    matching::DebtLedgerEntry,
    standardize::NameStandardizer,
    types::Money,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The drill-down result shape. An unresolvable or empty search term
/// yields the all-empty value, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetail {
    pub sales_records: Vec<SalesTransaction>,
    pub debt_records: Vec<DebtLedgerEntry>,
    pub total_sales: Money,
    pub recent_transaction_count: usize,
    pub matched_finance_ids: Vec<String>,
    pub matched_customer_names: Vec<String>,
}

/// True when the term has identifier shape: digits and hyphens only, with
/// at least one digit.
fn is_identifier(term: &str) -> bool {
    term.chars().all(|c| c.is_ascii_digit() || c == '-')
        && term.chars().any(|c| c.is_ascii_digit())
}

pub struct CustomerLookup<'a> {
    sales: &'a [SalesTransaction],
    debts: &'a [DebtLedgerEntry],
    standardizer: NameStandardizer,
    recent_window_days: i64,
}

impl<'a> CustomerLookup<'a> {
    pub fn new(
        sales: &'a [SalesTransaction],
        debts: &'a [DebtLedgerEntry],
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            sales,
            debts,
            standardizer: NameStandardizer::new(&config.matching.known_prefixes),
            recent_window_days: config.lookup.recent_window_days,
        }
    }

    pub fn lookup(&self, search_term: &str, as_of: NaiveDate) -> CustomerDetail {
        let term = search_term.trim();
        if term.is_empty() {
            return CustomerDetail::default();
        }

        if is_identifier(term) {
            let sales: Vec<SalesTransaction> = self
                .sales
                .iter()
                .filter(|r| r.finance_id == term)
                .cloned()
                .collect();
            if !sales.is_empty() {
                log::debug!("lookup '{term}': resolved via finance id, {} sales rows", sales.len());
                let debts: Vec<DebtLedgerEntry> = self
                    .debts
                    .iter()
                    .filter(|d| d.finance_id == term)
                    .cloned()
                    .collect();
                return self.assemble(sales, debts, as_of);
            }
        }

        let accepted = self.accept_names(term);
        log::debug!("lookup '{term}': {} customer names accepted", accepted.len());

        let sales: Vec<SalesTransaction> = self
            .sales
            .iter()
            .filter(|r| accepted.contains(r.customer_name.as_str()))
            .cloned()
            .collect();
        let debts: Vec<DebtLedgerEntry> = self
            .debts
            .iter()
            .filter(|d| accepted.contains(d.customer_name.as_str()))
            .cloned()
            .collect();

        self.assemble(sales, debts, as_of)
    }

    /// Name-based resolution over every distinct customer name in either
    /// ledger.
    fn accept_names(&self, term: &str) -> BTreeSet<&'a str> {
        let term_std = self.standardizer.standardize(term);
        let term_keywords = self.standardizer.extract_keywords(term);

        let candidates: BTreeSet<&str> = self
            .sales
            .iter()
            .map(|r| r.customer_name.as_str())
            .chain(self.debts.iter().map(|d| d.customer_name.as_str()))
            .collect();

        let mut accepted = BTreeSet::new();
        for name in candidates {
            let name_std = self.standardizer.standardize(name);
            let equal = !term_std.is_empty() && name_std == term_std;
            let contained = !term_std.is_empty()
                && !name_std.is_empty()
                && (name_std.contains(&term_std) || term_std.contains(&name_std));
            let overlap = !term_keywords.is_empty()
                && !self
                    .standardizer
                    .extract_keywords(name)
                    .is_disjoint(&term_keywords);
            if equal || contained || overlap {
                accepted.insert(name);
            }
        }
        accepted
    }

    fn assemble(
        &self,
        sales: Vec<SalesTransaction>,
        debts: Vec<DebtLedgerEntry>,
        as_of: NaiveDate,
    ) -> CustomerDetail {
        let total_sales: Money = sales.iter().map(|r| r.amount).sum();
        let cutoff = as_of - Duration::days(self.recent_window_days);
        let recent_transaction_count = sales
            .iter()
            .filter(|r| r.sale_date.is_some_and(|d| d >= cutoff))
            .count();

        let mut finance_ids = BTreeSet::new();
        let mut customer_names = BTreeSet::new();
        for row in &sales {
            finance_ids.insert(row.finance_id.clone());
            customer_names.insert(row.customer_name.clone());
        }
        for row in &debts {
            finance_ids.insert(row.finance_id.clone());
            customer_names.insert(row.customer_name.clone());
        }

        CustomerDetail {
            sales_records: sales,
            debt_records: debts,
            total_sales,
            recent_transaction_count,
            matched_finance_ids: finance_ids.into_iter().collect(),
            matched_customer_names: customer_names.into_iter().collect(),
        }
    }
}
