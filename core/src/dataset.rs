//! Deterministic synthetic-ledger generation using curated name lists.
//!
//! Produces paired sales and debt ledgers for a building-materials trading
//! domain, with the same noise the real ledgers carry: organizational
//! prefixes on the debt side, delimiter variants, department tags, and
//! finance ids shared across departments. Same seed, same dataset.

use crate::{
    aggregate::SalesTransaction,
    classify::PERSISTENT_DEBT_TREND,
    matching::DebtLedgerEntry,
    rng::DatasetRng,
};
use chrono::{Duration, NaiveDate};

/// The organizational prefix the debt ledger decorates names with.
const LEDGER_PREFIX: &str = "鑫帅辉";

/// Curated core business names.
const NAME_CORES: &[&str] = &[
    "九方昌盛", "宏达", "瑞丰", "金鑫", "恒泰", "蓝天", "永顺", "华星",
    "东成", "三和", "广源", "泰安居", "同德", "万隆", "鸿运", "盛世华彩",
    "富民", "嘉禾", "旭日", "长青",
];

/// Storefront suffixes as they appear on the sales ledger.
const STORE_SUFFIXES: &[&str] = &["门市", "门市部", "经营部", "商行", "商贸", "建材店", "批发部"];

/// Department tags the debt ledger files customers under.
const DEPARTMENTS: &[&str] = &["古建", "陶瓷", "批发", "零售"];

/// Product names for sales rows.
const PRODUCTS: &[&str] = &[
    "青砖", "琉璃瓦", "仿古地砖", "陶瓷外墙砖", "釉面砖", "广场砖", "烧结砖", "文化石",
];

#[derive(Debug, Clone, Default)]
pub struct SyntheticLedgers {
    pub sales: Vec<SalesTransaction>,
    pub debts: Vec<DebtLedgerEntry>,
}

/// Generate paired ledgers for `customers` synthetic customers, with sale
/// dates scattered over the 400 days before `as_of`.
pub fn generate(seed: u64, customers: usize, as_of: NaiveDate) -> SyntheticLedgers {
    let mut rng = DatasetRng::new(seed);
    let mut out = SyntheticLedgers::default();

    for i in 0..customers {
        let finance_id = format!("{}-{:03}", 400 + rng.next_u64_below(30), i + 1);
        let base_name = format!("{}{}", rng.pick(NAME_CORES), rng.pick(STORE_SUFFIXES));

        // Roughly one customer in eight exists only on the debt ledger.
        let has_sales = !rng.chance(0.12);
        if has_sales {
            let txn_count = 1 + rng.next_u64_below(8);
            for _ in 0..txn_count {
                let days_back = rng.next_u64_below(400) as i64;
                out.sales.push(SalesTransaction {
                    finance_id: finance_id.clone(),
                    customer_name: base_name.clone(),
                    product_name: rng.pick(PRODUCTS).to_string(),
                    amount: (rng.range_f64(200.0, 20_000.0) * 100.0).round() / 100.0,
                    quantity: 1 + rng.next_u64_below(200) as i64,
                    sale_date: Some(as_of - Duration::days(days_back)),
                });
            }
        }

        // Roughly seven in ten customers carry a debt-ledger row.
        if rng.chance(0.7) || !has_sales {
            let department = rng.pick(DEPARTMENTS).to_string();
            let side_name = debt_side_name(&mut rng, &base_name, &department);
            out.debts.push(debt_entry(
                &mut rng,
                &finance_id,
                &side_name,
                &department,
            ));

            // Occasionally the same legal entity is filed under a second
            // department sharing the finance id.
            if rng.chance(0.15) {
                let second = rng.pick(DEPARTMENTS).to_string();
                let second_name = debt_side_name(&mut rng, &base_name, &second);
                out.debts.push(debt_entry(
                    &mut rng,
                    &finance_id,
                    &second_name,
                    &second,
                ));
            }
        }
    }

    out
}

/// The debt ledger writes the same customer under decorated spellings.
fn debt_side_name(rng: &mut DatasetRng, base_name: &str, department: &str) -> String {
    match rng.next_u64_below(4) {
        0 => base_name.to_string(),
        1 => format!("{LEDGER_PREFIX}-{base_name}"),
        2 => format!("{base_name}({department})"),
        _ => format!("{base_name} {department}"),
    }
}

fn debt_entry(
    rng: &mut DatasetRng,
    finance_id: &str,
    customer_name: &str,
    department: &str,
) -> DebtLedgerEntry {
    let year_debt = |rng: &mut DatasetRng| {
        if rng.chance(0.6) {
            (rng.range_f64(0.0, 60_000.0) * 100.0).round() / 100.0
        } else {
            0.0
        }
    };
    let debt_2023 = year_debt(rng);
    let debt_2024 = year_debt(rng);
    let debt_2025 = year_debt(rng);
    let debt_trend = if debt_2023 > 0.0 && debt_2024 > 0.0 && debt_2025 > 0.0 {
        PERSISTENT_DEBT_TREND.to_string()
    } else {
        String::new()
    };

    DebtLedgerEntry {
        finance_id: finance_id.to_string(),
        customer_name: customer_name.to_string(),
        department: department.to_string(),
        debt_2023,
        debt_2024,
        debt_2025,
        debt_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(12345, 40, anchor());
        let b = generate(12345, 40, anchor());

        assert_eq!(a.sales.len(), b.sales.len());
        assert_eq!(a.debts.len(), b.debts.len());
        for (x, y) in a.sales.iter().zip(&b.sales) {
            assert_eq!(x.finance_id, y.finance_id);
            assert_eq!(x.customer_name, y.customer_name);
            assert_eq!(x.amount, y.amount);
            assert_eq!(x.sale_date, y.sale_date);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate(1, 40, anchor());
        let b = generate(2, 40, anchor());
        let same = a.sales.len() == b.sales.len()
            && a.sales
                .iter()
                .zip(&b.sales)
                .all(|(x, y)| x.customer_name == y.customer_name && x.amount == y.amount);
        assert!(!same, "seeds 1 and 2 produced identical sales ledgers");
    }

    #[test]
    fn generates_plausible_rows() {
        let data = generate(7, 60, anchor());
        assert!(!data.sales.is_empty());
        assert!(!data.debts.is_empty());

        for row in &data.sales {
            assert!(!row.finance_id.is_empty());
            assert!(!row.customer_name.is_empty());
            assert!(row.amount >= 0.0);
            assert!(row.quantity >= 1);
            assert!(row.sale_date.is_some());
        }
        for row in &data.debts {
            assert!(!row.customer_name.is_empty());
            assert!(row.debt_2025 >= 0.0);
        }
    }
}
