//! The matching engine: resolves each debt-ledger row to at most one
//! sales aggregate through a fixed four-strategy cascade.
//!
//! Strategy order per debt row (first hit wins, later strategies are not
//! attempted):
//!   1. exact:            finance id equality + standardized-name equality
//!   2. name_contains:    finance id equality + containment or similarity
//!   3. keyword:          finance id equality + keyword-set overlap
//!   4. finance_id_only:  finance id equality alone; the most transacted,
//!                        most recently active aggregate wins
//!
//! RULES:
//!   - Each sales aggregate is consumed by at most one debt row. The
//!     used-flag arena makes the invariant auditable per strategy.
//!   - A debt row that cannot claim an unconsumed aggregate becomes a
//!     debt_only outcome. One legal entity filed under several department
//!     ledgers has a single underlying sales history, so the second row
//!     for the same finance id falls through to debt_only.
//!   - Aggregates left unconsumed after all debt rows become sales_only.
//!
//! Resolution is deterministic given deterministic input ordering.

use crate::{
    aggregate::SalesAggregate,
    config::MatchingConfig,
    similarity::SimilarityScorer,
    standardize::NameStandardizer,
    types::{FinanceId, Money},
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

/// A raw debt-ledger row as supplied by the external store. Authoritative
/// for debt amounts; one row per (finance id, customer name, department).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtLedgerEntry {
    pub finance_id: FinanceId,
    pub customer_name: String,
    pub department: String,
    pub debt_2023: Money,
    pub debt_2024: Money,
    pub debt_2025: Money,
    /// Externally supplied trend classification, empty when absent.
    pub debt_trend: String,
}

/// Provenance tag on a merged record: which resolution strategy (or lack
/// thereof) produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    NameContains,
    Keyword,
    FinanceIdOnly,
    DebtOnly,
    SalesOnly,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::NameContains => "name_contains",
            MatchType::Keyword => "keyword",
            MatchType::FinanceIdOnly => "finance_id_only",
            MatchType::DebtOnly => "debt_only",
            MatchType::SalesOnly => "sales_only",
        }
    }

    /// True for the four strategies that consume a sales aggregate.
    pub fn consumes_aggregate(&self) -> bool {
        matches!(
            self,
            MatchType::Exact | MatchType::NameContains | MatchType::Keyword | MatchType::FinanceIdOnly
        )
    }
}

/// Resolution outcome for one debt row, in debt-ledger input order.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub debt_index: usize,
    pub aggregate_index: Option<usize>,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// One outcome per debt row, same order as the input.
    pub outcomes: Vec<MatchOutcome>,
    /// Aggregate indices consumed by no debt row, in input order.
    pub unmatched_sales: Vec<usize>,
}

pub struct MatchingEngine {
    standardizer: NameStandardizer,
    scorer: SimilarityScorer,
}

impl MatchingEngine {
    pub fn new(config: &MatchingConfig) -> Self {
        let standardizer = NameStandardizer::new(&config.known_prefixes);
        let scorer = SimilarityScorer::new(standardizer.clone(), config.similarity_threshold);
        Self {
            standardizer,
            scorer,
        }
    }

    /// Resolve every debt row against the aggregate pool.
    pub fn resolve(
        &self,
        debts: &[DebtLedgerEntry],
        aggregates: &[SalesAggregate],
    ) -> MatchResult {
        let mut used = vec![false; aggregates.len()];

        let mut by_finance_id: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, agg) in aggregates.iter().enumerate() {
            by_finance_id
                .entry(agg.finance_id.as_str())
                .or_default()
                .push(i);
        }

        let aggregate_keywords: Vec<BTreeSet<String>> = aggregates
            .iter()
            .map(|a| self.standardizer.extract_keywords(&a.customer_name))
            .collect();

        let empty_pool: Vec<usize> = Vec::new();
        let mut outcomes = Vec::with_capacity(debts.len());

        for (debt_index, debt) in debts.iter().enumerate() {
            let pool = by_finance_id
                .get(debt.finance_id.as_str())
                .unwrap_or(&empty_pool);
            let debt_std = self.standardizer.standardize(&debt.customer_name);
            let debt_keywords = self.standardizer.extract_keywords(&debt.customer_name);

            let hit = find_exact(pool, &used, aggregates, &debt_std)
                .map(|i| (i, MatchType::Exact))
                .or_else(|| {
                    self.find_name_contains(pool, &used, aggregates, debt, &debt_std)
                        .map(|i| (i, MatchType::NameContains))
                })
                .or_else(|| {
                    find_keyword(pool, &used, &aggregate_keywords, &debt_keywords)
                        .map(|i| (i, MatchType::Keyword))
                })
                .or_else(|| {
                    find_most_active(pool, &used, aggregates).map(|i| (i, MatchType::FinanceIdOnly))
                });

            match hit {
                Some((aggregate_index, match_type)) => {
                    used[aggregate_index] = true;
                    log::debug!(
                        "debt row {debt_index} ({}) matched aggregate {aggregate_index} via {}",
                        debt.finance_id,
                        match_type.as_str()
                    );
                    outcomes.push(MatchOutcome {
                        debt_index,
                        aggregate_index: Some(aggregate_index),
                        match_type,
                    });
                }
                None => {
                    outcomes.push(MatchOutcome {
                        debt_index,
                        aggregate_index: None,
                        match_type: MatchType::DebtOnly,
                    });
                }
            }
        }

        let unmatched_sales = (0..aggregates.len()).filter(|&i| !used[i]).collect();

        MatchResult {
            outcomes,
            unmatched_sales,
        }
    }

    fn find_name_contains(
        &self,
        pool: &[usize],
        used: &[bool],
        aggregates: &[SalesAggregate],
        debt: &DebtLedgerEntry,
        debt_std: &str,
    ) -> Option<usize> {
        pool.iter().copied().find(|&i| {
            if used[i] {
                return false;
            }
            let agg = &aggregates[i];
            let agg_std = agg.standardized_name.as_str();
            let contains = !debt_std.is_empty()
                && !agg_std.is_empty()
                && (agg_std.contains(debt_std) || debt_std.contains(agg_std));
            contains || self.scorer.is_similar(&debt.customer_name, &agg.customer_name)
        })
    }
}

fn find_exact(
    pool: &[usize],
    used: &[bool],
    aggregates: &[SalesAggregate],
    debt_std: &str,
) -> Option<usize> {
    pool.iter()
        .copied()
        .find(|&i| !used[i] && aggregates[i].standardized_name == debt_std)
}

fn find_keyword(
    pool: &[usize],
    used: &[bool],
    aggregate_keywords: &[BTreeSet<String>],
    debt_keywords: &BTreeSet<String>,
) -> Option<usize> {
    if debt_keywords.is_empty() {
        return None;
    }
    pool.iter()
        .copied()
        .find(|&i| !used[i] && !aggregate_keywords[i].is_disjoint(debt_keywords))
}

/// Tie-break for the finance-id-only strategy: most transactions first,
/// then most recent sale; aggregates with no sale date sort last.
fn find_most_active(pool: &[usize], used: &[bool], aggregates: &[SalesAggregate]) -> Option<usize> {
    pool.iter()
        .copied()
        .filter(|&i| !used[i])
        .min_by_key(|&i| {
            let agg = &aggregates[i];
            (
                Reverse(agg.transaction_count),
                agg.days_since_last_sale.unwrap_or(i64::MAX),
            )
        })
}
