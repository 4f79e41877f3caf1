//! End-to-end pipeline tests over the engine and the store.
//!
//! Verified behaviors:
//! 1. Idempotence: the same snapshots produce byte-identical output.
//! 2. Coverage: every debt row yields exactly one merged record; every
//!    unmatched aggregate yields exactly one sales_only record.
//! 3. Score bounds and level/bucket agreement on every record.
//! 4. Ratio safety: no division by zero when sales are absent.
//! 5. Empty input tables are a valid terminal state.

use chrono::NaiveDate;
use ledgerlink_core::{
    aggregate::SalesTransaction,
    classify::{CustomerTier, RiskLevel},
    config::AnalysisConfig,
    engine::{run_pipeline, AnalysisEngine},
    matching::{DebtLedgerEntry, MatchType},
    store::AnalysisStore,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Idempotence and determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn rerunning_the_analysis_is_byte_identical() {
    let engine = AnalysisEngine::build_test(0xCAFE, 90).unwrap();

    let first = engine.run().unwrap();
    let second = engine.run().unwrap();

    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b, "identical snapshots must produce identical output");

    assert_eq!(
        engine.store.merged_record_count().unwrap(),
        first.len() as i64,
        "the merged table is replaced, not appended"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Coverage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn every_debt_row_yields_exactly_one_record() {
    let engine = AnalysisEngine::build_test(7, 120).unwrap();
    let records = engine.run().unwrap();
    let debts = engine.store.load_debt_records().unwrap();

    let mut from_debts: Vec<(String, String, String)> = records
        .iter()
        .filter(|r| r.match_type != MatchType::SalesOnly)
        .map(|r| (r.finance_id.clone(), r.customer_name.clone(), r.department.clone()))
        .collect();
    let mut expected: Vec<(String, String, String)> = debts
        .iter()
        .map(|d| (d.finance_id.clone(), d.customer_name.clone(), d.department.clone()))
        .collect();

    from_debts.sort();
    expected.sort();
    assert_eq!(from_debts, expected);
}

#[test]
fn sales_only_records_carry_zeroed_debt_fields() {
    let engine = AnalysisEngine::build_test(21, 100).unwrap();
    let records = engine.run().unwrap();

    let sales_only: Vec<_> = records
        .iter()
        .filter(|r| r.match_type == MatchType::SalesOnly)
        .collect();
    assert!(!sales_only.is_empty(), "the fixture always leaves some aggregates unmatched");

    for r in sales_only {
        assert_eq!(r.debt_2023, 0.0);
        assert_eq!(r.debt_2024, 0.0);
        assert_eq!(r.debt_2025, 0.0);
        assert!(r.department.is_empty());
        assert_eq!(r.debt_to_sales_ratio, 0.0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Score bounds and ratio safety
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn scores_stay_in_bounds_and_match_their_bucket() {
    let engine = AnalysisEngine::build_test(99, 150).unwrap();
    let records = engine.run().unwrap();

    for r in &records {
        assert!(
            (0..=100).contains(&r.risk_score),
            "score {} out of bounds for {}",
            r.risk_score,
            r.customer_name
        );
        let expected = match r.risk_score {
            s if s >= 80 => RiskLevel::Low,
            s if s >= 60 => RiskLevel::ModerateLow,
            s if s >= 40 => RiskLevel::Moderate,
            s if s >= 20 => RiskLevel::ModerateHigh,
            _ => RiskLevel::High,
        };
        assert_eq!(r.risk_level, expected);
    }
}

#[test]
fn zero_sales_never_divides() {
    let engine = AnalysisEngine::build_test(3, 150).unwrap();
    let records = engine.run().unwrap();

    for r in records.iter().filter(|r| r.total_amount == 0.0) {
        assert_eq!(r.debt_to_sales_ratio, 0.0);
        assert!(r.debt_to_sales_ratio.is_finite());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Empty inputs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_ledgers_produce_an_empty_result() {
    let store = AnalysisStore::in_memory().unwrap();
    store.migrate().unwrap();
    let engine = AnalysisEngine::new(store, AnalysisConfig::default(), as_of());

    let records = engine.run().unwrap();
    assert!(records.is_empty());
    assert_eq!(engine.store.merged_record_count().unwrap(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// End to end over a known ledger pair
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decorated_debt_name_reconciles_against_its_sales_history() {
    let mut sales = Vec::new();
    for _ in 0..3 {
        sales.push(SalesTransaction {
            finance_id: "413-001".into(),
            customer_name: "九方昌盛门市".into(),
            product_name: "琉璃瓦".into(),
            amount: 20_000.0,
            quantity: 40,
            sale_date: Some(as_of() - chrono::Duration::days(7)),
        });
    }
    let debts = vec![DebtLedgerEntry {
        finance_id: "413-001".into(),
        customer_name: "鑫帅辉-九方昌盛门市".into(),
        department: "古建".into(),
        debt_2023: 0.0,
        debt_2024: 0.0,
        debt_2025: 20_000.0,
        debt_trend: String::new(),
    }];

    let records = run_pipeline(&sales, &debts, as_of(), &AnalysisConfig::default());
    assert_eq!(records.len(), 1);

    let rec = &records[0];
    assert_eq!(rec.match_type, MatchType::NameContains);
    assert_eq!(rec.total_amount, 60_000.0);
    assert!((rec.debt_to_sales_ratio - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(rec.customer_tier, CustomerTier::C2MediumRiskDebt);
    // 100 - 20 (debt band) - 15 (ratio band).
    assert_eq!(rec.risk_score, 65);
    assert_eq!(rec.risk_level, RiskLevel::ModerateLow);
}
