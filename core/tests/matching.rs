//! Integration tests for the matching engine cascade.
//!
//! Verified behaviors:
//! 1. Strategy precedence: exact beats contains beats keyword beats
//!    finance-id-only.
//! 2. Each sales aggregate is consumed by at most one debt row.
//! 3. Two department ledgers sharing a finance id split into one match
//!    and one debt_only outcome.
//! 4. The finance-id-only tie-break prefers the most transacted, most
//!    recently active aggregate.

use chrono::NaiveDate;
use ledgerlink_core::{
    aggregate::{aggregate_sales, SalesAggregate, SalesTransaction},
    config::AnalysisConfig,
    dataset,
    matching::{DebtLedgerEntry, MatchResult, MatchType, MatchingEngine},
    standardize::NameStandardizer,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn sale(finance_id: &str, name: &str, amount: f64, days_back: i64) -> SalesTransaction {
    SalesTransaction {
        finance_id: finance_id.into(),
        customer_name: name.into(),
        product_name: "青砖".into(),
        amount,
        quantity: 10,
        sale_date: Some(as_of() - chrono::Duration::days(days_back)),
    }
}

fn debt(finance_id: &str, name: &str, department: &str, debt_2025: f64) -> DebtLedgerEntry {
    DebtLedgerEntry {
        finance_id: finance_id.into(),
        customer_name: name.into(),
        department: department.into(),
        debt_2023: 0.0,
        debt_2024: 0.0,
        debt_2025,
        debt_trend: String::new(),
    }
}

fn resolve(
    sales: &[SalesTransaction],
    debts: &[DebtLedgerEntry],
) -> (MatchResult, Vec<SalesAggregate>) {
    let config = AnalysisConfig::default();
    let standardizer = NameStandardizer::new(&config.matching.known_prefixes);
    let aggregates = aggregate_sales(sales, as_of(), &standardizer, &config.classifier);
    let engine = MatchingEngine::new(&config.matching);
    let result = engine.resolve(debts, &aggregates);
    (result, aggregates)
}

// ─────────────────────────────────────────────────────────────────────────────
// Strategy precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn identical_standardized_names_match_exactly() {
    let sales = vec![sale("413-001", "九方昌盛门市", 5000.0, 10)];
    let debts = vec![debt("413-001", "九方昌盛门市", "古建", 1000.0)];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].match_type, MatchType::Exact);
    assert_eq!(result.outcomes[0].aggregate_index, Some(0));
}

#[test]
fn prefix_decorated_name_matches_by_containment() {
    let sales = vec![sale("413-001", "九方昌盛门市", 5000.0, 10)];
    let debts = vec![debt("413-001", "鑫帅辉-九方昌盛门市", "古建", 1000.0)];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(
        result.outcomes[0].match_type,
        MatchType::NameContains,
        "prefix decoration keeps the hyphen, so equality fails but containment holds"
    );
}

#[test]
fn shared_token_matches_by_keyword() {
    // Containment and similarity both fail; the shared token does not.
    let sales = vec![sale("413-002", "恒泰-门市部", 5000.0, 10)];
    let debts = vec![debt("413-002", "恒泰 古建", "古建", 1000.0)];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(result.outcomes[0].match_type, MatchType::Keyword);
}

#[test]
fn unrelated_name_falls_back_to_finance_id() {
    let sales = vec![sale("413-003", "广源商行", 5000.0, 10)];
    let debts = vec![debt("413-003", "旭日嘉禾", "陶瓷", 1000.0)];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(result.outcomes[0].match_type, MatchType::FinanceIdOnly);
    assert_eq!(result.outcomes[0].aggregate_index, Some(0));
}

#[test]
fn no_shared_finance_id_yields_debt_only() {
    let sales = vec![sale("413-004", "广源商行", 5000.0, 10)];
    let debts = vec![debt("888-001", "广源商行", "批发", 1000.0)];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(result.outcomes[0].match_type, MatchType::DebtOnly);
    assert_eq!(result.outcomes[0].aggregate_index, None);
    // The identically named aggregate under another finance id stays free.
    assert_eq!(result.unmatched_sales, vec![0]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Finance-id-only tie-break
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn tie_break_prefers_more_transactions() {
    let mut sales = Vec::new();
    // Aggregate 0: two recent rows. Aggregate 1: five older rows.
    for _ in 0..2 {
        sales.push(sale("500-001", "广源商行", 1000.0, 5));
    }
    for _ in 0..5 {
        sales.push(sale("500-001", "万隆门市", 1000.0, 60));
    }
    let debts = vec![debt("500-001", "旭日嘉禾", "零售", 1000.0)];

    let (result, aggregates) = resolve(&sales, &debts);
    let hit = result.outcomes[0].aggregate_index.unwrap();
    assert_eq!(aggregates[hit].customer_name, "万隆门市");
}

#[test]
fn tie_break_prefers_recency_on_equal_transactions() {
    let sales = vec![
        sale("500-002", "广源商行", 1000.0, 50),
        sale("500-002", "万隆门市", 1000.0, 5),
    ];
    let debts = vec![debt("500-002", "旭日嘉禾", "零售", 1000.0)];

    let (result, aggregates) = resolve(&sales, &debts);
    let hit = result.outcomes[0].aggregate_index.unwrap();
    assert_eq!(aggregates[hit].customer_name, "万隆门市");
}

// ─────────────────────────────────────────────────────────────────────────────
// Consumption invariant
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn second_department_row_becomes_debt_only() {
    let sales = vec![sale("413-005", "九方昌盛门市", 5000.0, 10)];
    let debts = vec![
        debt("413-005", "九方昌盛门市", "古建", 1000.0),
        debt("413-005", "九方昌盛门市", "陶瓷", 2000.0),
    ];

    let (result, _) = resolve(&sales, &debts);
    assert_eq!(result.outcomes[0].match_type, MatchType::Exact);
    assert_eq!(result.outcomes[0].aggregate_index, Some(0));
    assert_eq!(
        result.outcomes[1].match_type,
        MatchType::DebtOnly,
        "the single sales history was already consumed by the first ledger row"
    );
    assert!(result.unmatched_sales.is_empty());
}

#[test]
fn each_aggregate_consumed_at_most_once_over_generated_ledgers() {
    let data = dataset::generate(0xBEEF, 120, as_of());
    let (result, aggregates) = resolve(&data.sales, &data.debts);

    let mut seen = vec![false; aggregates.len()];
    for outcome in &result.outcomes {
        if let Some(i) = outcome.aggregate_index {
            assert!(outcome.match_type.consumes_aggregate());
            assert!(
                !seen[i],
                "aggregate {i} consumed by more than one debt row"
            );
            seen[i] = true;
        } else {
            assert_eq!(outcome.match_type, MatchType::DebtOnly);
        }
    }

    // Consumed plus unmatched partitions the aggregate pool exactly.
    let consumed = seen.iter().filter(|&&s| s).count();
    assert_eq!(consumed + result.unmatched_sales.len(), aggregates.len());
    for &i in &result.unmatched_sales {
        assert!(!seen[i]);
    }
}
