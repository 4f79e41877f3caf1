//! Sales aggregation: reduces raw transaction rows to one summary row per
//! (finance id, customer name) pair, with recency-derived activity metrics.
//!
//! Aggregates are immutable once produced and are consumed only by the
//! matching engine. Output order follows first appearance in the input,
//! which keeps the whole pipeline deterministic.

use crate::{
    config::ClassifierConfig,
    standardize::NameStandardizer,
    types::{FinanceId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A raw sales-ledger row as supplied by the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTransaction {
    pub finance_id: FinanceId,
    pub customer_name: String,
    pub product_name: String,
    pub amount: Money,
    pub quantity: i64,
    pub sale_date: Option<NaiveDate>,
}

/// Bucketed recency of the last sale. Used both as a matching tie-break
/// input and as a risk-scoring input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    Active30d,
    Active90d,
    Active180d,
    Dormant,
    NoSalesRecord,
}

impl ActivityTier {
    pub fn from_days(days_since_last_sale: Option<i64>, cfg: &ClassifierConfig) -> Self {
        match days_since_last_sale {
            None => ActivityTier::NoSalesRecord,
            Some(d) if d <= cfg.active_days => ActivityTier::Active30d,
            Some(d) if d <= cfg.warm_days => ActivityTier::Active90d,
            Some(d) if d <= cfg.cool_days => ActivityTier::Active180d,
            Some(_) => ActivityTier::Dormant,
        }
    }

    /// Any band with a sale inside the widest recency window.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ActivityTier::Active30d | ActivityTier::Active90d | ActivityTier::Active180d
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTier::Active30d => "active_30d",
            ActivityTier::Active90d => "active_90d",
            ActivityTier::Active180d => "active_180d",
            ActivityTier::Dormant => "dormant",
            ActivityTier::NoSalesRecord => "no_sales_record",
        }
    }
}

/// One summary row per (finance id, customer name) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub finance_id: FinanceId,
    pub customer_name: String,
    pub standardized_name: String,
    pub total_amount: Money,
    pub total_quantity: i64,
    pub unique_product_count: i64,
    pub transaction_count: i64,
    pub last_sale_date: Option<NaiveDate>,
    pub days_since_last_sale: Option<i64>,
    pub activity_tier: ActivityTier,
}

struct AggregateAccumulator {
    finance_id: FinanceId,
    customer_name: String,
    total_amount: Money,
    total_quantity: i64,
    products: HashSet<String>,
    transaction_count: i64,
    last_sale_date: Option<NaiveDate>,
}

/// Reduce raw sales rows to aggregates, anchored at `as_of` for recency.
pub fn aggregate_sales(
    rows: &[SalesTransaction],
    as_of: NaiveDate,
    standardizer: &NameStandardizer,
    cfg: &ClassifierConfig,
) -> Vec<SalesAggregate> {
    let mut order: Vec<AggregateAccumulator> = Vec::new();
    let mut index: HashMap<(FinanceId, String), usize> = HashMap::new();

    for row in rows {
        let key = (row.finance_id.clone(), row.customer_name.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            order.push(AggregateAccumulator {
                finance_id: row.finance_id.clone(),
                customer_name: row.customer_name.clone(),
                total_amount: 0.0,
                total_quantity: 0,
                products: HashSet::new(),
                transaction_count: 0,
                last_sale_date: None,
            });
            order.len() - 1
        });

        let acc = &mut order[slot];
        acc.total_amount += row.amount;
        acc.total_quantity += row.quantity;
        if !row.product_name.trim().is_empty() {
            acc.products.insert(row.product_name.clone());
        }
        acc.transaction_count += 1;
        if let Some(date) = row.sale_date {
            acc.last_sale_date = Some(acc.last_sale_date.map_or(date, |prev| prev.max(date)));
        }
    }

    order
        .into_iter()
        .map(|acc| {
            let days_since_last_sale = acc
                .last_sale_date
                .map(|d| as_of.signed_duration_since(d).num_days().max(0));
            SalesAggregate {
                standardized_name: standardizer.standardize(&acc.customer_name),
                activity_tier: ActivityTier::from_days(days_since_last_sale, cfg),
                finance_id: acc.finance_id,
                customer_name: acc.customer_name,
                total_amount: acc.total_amount,
                total_quantity: acc.total_quantity,
                unique_product_count: acc.products.len() as i64,
                transaction_count: acc.transaction_count,
                last_sale_date: acc.last_sale_date,
                days_since_last_sale,
            }
        })
        .collect()
}
