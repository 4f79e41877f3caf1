//! Record merging: builds the uniform output schema from match outcomes.
//!
//! Three shapes share one field set: matched (both sides present),
//! debt_only (sales side zeroed), sales_only (debt side zeroed). The debt
//! row is authoritative for identity and department on matched records.

use crate::{
    aggregate::{ActivityTier, SalesAggregate},
    classify::{CustomerTier, RiskLevel},
    matching::{DebtLedgerEntry, MatchResult, MatchType},
    types::{FinanceId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The unified output record, one per debt row plus one per unmatched
/// sales aggregate. Recomputed from scratch on every analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRecord {
    pub finance_id: FinanceId,
    pub customer_name: String,
    pub department: String,
    pub match_type: MatchType,
    pub total_amount: Money,
    pub total_quantity: i64,
    pub unique_product_count: i64,
    pub transaction_count: i64,
    pub last_sale_date: Option<NaiveDate>,
    pub days_since_last_sale: Option<i64>,
    pub activity_tier: ActivityTier,
    pub debt_2023: Money,
    pub debt_2024: Money,
    pub debt_2025: Money,
    pub debt_trend: String,
    /// Current-year debt over total sales, as a percentage. 0 when there
    /// are no sales.
    pub debt_to_sales_ratio: f64,
    pub customer_tier: CustomerTier,
    pub risk_score: i64,
    pub risk_level: RiskLevel,
}

/// `debt_2025 / total_amount * 100`, guarded against division by zero.
pub fn debt_to_sales_ratio(debt_2025: Money, total_amount: Money) -> f64 {
    if total_amount > 0.0 {
        debt_2025 / total_amount * 100.0
    } else {
        0.0
    }
}

/// Build one merged record per match outcome, then one per unmatched
/// aggregate. Tier, score and level carry neutral values here and are
/// filled in by `classify::apply`.
pub fn build_records(
    result: &MatchResult,
    debts: &[DebtLedgerEntry],
    aggregates: &[SalesAggregate],
) -> Vec<MergedRecord> {
    let mut records = Vec::with_capacity(result.outcomes.len() + result.unmatched_sales.len());

    for outcome in &result.outcomes {
        let debt = &debts[outcome.debt_index];
        match outcome.aggregate_index {
            Some(i) => records.push(matched_record(debt, &aggregates[i], outcome.match_type)),
            None => records.push(debt_only_record(debt)),
        }
    }

    for &i in &result.unmatched_sales {
        records.push(sales_only_record(&aggregates[i]));
    }

    records
}

fn matched_record(
    debt: &DebtLedgerEntry,
    agg: &SalesAggregate,
    match_type: MatchType,
) -> MergedRecord {
    MergedRecord {
        finance_id: debt.finance_id.clone(),
        customer_name: debt.customer_name.clone(),
        department: debt.department.clone(),
        match_type,
        total_amount: agg.total_amount,
        total_quantity: agg.total_quantity,
        unique_product_count: agg.unique_product_count,
        transaction_count: agg.transaction_count,
        last_sale_date: agg.last_sale_date,
        days_since_last_sale: agg.days_since_last_sale,
        activity_tier: agg.activity_tier,
        debt_2023: debt.debt_2023,
        debt_2024: debt.debt_2024,
        debt_2025: debt.debt_2025,
        debt_trend: debt.debt_trend.clone(),
        debt_to_sales_ratio: debt_to_sales_ratio(debt.debt_2025, agg.total_amount),
        customer_tier: CustomerTier::IncompleteData,
        risk_score: 0,
        risk_level: RiskLevel::High,
    }
}

fn debt_only_record(debt: &DebtLedgerEntry) -> MergedRecord {
    MergedRecord {
        finance_id: debt.finance_id.clone(),
        customer_name: debt.customer_name.clone(),
        department: debt.department.clone(),
        match_type: MatchType::DebtOnly,
        total_amount: 0.0,
        total_quantity: 0,
        unique_product_count: 0,
        transaction_count: 0,
        last_sale_date: None,
        days_since_last_sale: None,
        activity_tier: ActivityTier::NoSalesRecord,
        debt_2023: debt.debt_2023,
        debt_2024: debt.debt_2024,
        debt_2025: debt.debt_2025,
        debt_trend: debt.debt_trend.clone(),
        debt_to_sales_ratio: 0.0,
        customer_tier: CustomerTier::IncompleteData,
        risk_score: 0,
        risk_level: RiskLevel::High,
    }
}

fn sales_only_record(agg: &SalesAggregate) -> MergedRecord {
    MergedRecord {
        finance_id: agg.finance_id.clone(),
        customer_name: agg.customer_name.clone(),
        department: String::new(),
        match_type: MatchType::SalesOnly,
        total_amount: agg.total_amount,
        total_quantity: agg.total_quantity,
        unique_product_count: agg.unique_product_count,
        transaction_count: agg.transaction_count,
        last_sale_date: agg.last_sale_date,
        days_since_last_sale: agg.days_since_last_sale,
        activity_tier: agg.activity_tier,
        debt_2023: 0.0,
        debt_2024: 0.0,
        debt_2025: 0.0,
        debt_trend: String::new(),
        debt_to_sales_ratio: 0.0,
        customer_tier: CustomerTier::IncompleteData,
        risk_score: 0,
        risk_level: RiskLevel::High,
    }
}
