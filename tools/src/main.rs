//! analysis-runner: headless runner for the ledger reconciliation engine.
//!
//! Usage:
//!   analysis-runner --seed 42 --customers 80
//!   analysis-runner --db ledgers.db --as-of 2025-07-01 --csv merged.csv
//!   analysis-runner --db ledgers.db --search 413-001

use anyhow::Result;
use chrono::NaiveDate;
use ledgerlink_core::{
    config::AnalysisConfig,
    dataset,
    engine::AnalysisEngine,
    merge::MergedRecord,
    store::AnalysisStore,
};
use std::env;
use std::io::Write;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 0usize);
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let as_of = match str_arg(&args, "--as-of") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ledgerlink_core::error::AnalysisError::InvalidDate { raw: raw.into() }
        })?,
        None => chrono::Local::now().date_naive(),
    };
    let config = match str_arg(&args, "--config") {
        Some(path) => AnalysisConfig::from_json_file(Path::new(path))?,
        None => AnalysisConfig::default(),
    };
    let json_mode = args.iter().any(|a| a == "--json");

    if !json_mode {
        println!("LedgerLink analysis-runner");
        println!("  db:        {db}");
        println!("  as-of:     {as_of}");
        if customers > 0 {
            println!("  seed:      {seed}");
            println!("  customers: {customers}");
        }
        println!();
    }

    let store = AnalysisStore::open(db)?;
    store.migrate()?;

    // Demo mode: seed a synthetic pair of ledgers before analyzing.
    if customers > 0 {
        let data = dataset::generate(seed, customers, as_of);
        for row in &data.sales {
            store.insert_sales_transaction(row)?;
        }
        for row in &data.debts {
            store.insert_debt_record(row)?;
        }
    }

    let engine = AnalysisEngine::new(store, config, as_of);

    if let Some(term) = str_arg(&args, "--search") {
        let detail = engine.customer_detail(term)?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let records = engine.run()?;

    if let Some(path) = str_arg(&args, "--csv") {
        write_csv(path, &records)?;
        if !json_mode {
            println!("wrote {} records to {path}", records.len());
        }
    }

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_summary(&engine)?;
    }

    Ok(())
}

fn print_summary(engine: &AnalysisEngine) -> Result<()> {
    println!("Rows:");
    println!("  sales transactions: {}", engine.store.sales_transaction_count()?);
    println!("  debt records:       {}", engine.store.debt_record_count()?);
    println!("  merged records:     {}", engine.store.merged_record_count()?);

    println!("\nMatch types:");
    for (label, count) in engine.store.match_type_distribution()? {
        println!("  {label:<18} {count}");
    }

    println!("\nCustomer tiers:");
    for (label, count) in engine.store.tier_distribution()? {
        println!("  {label:<28} {count}");
    }

    println!("\nRisk levels:");
    for (label, count) in engine.store.risk_level_distribution()? {
        println!("  {label:<14} {count}");
    }

    Ok(())
}

fn write_csv(path: &str, records: &[MergedRecord]) -> Result<()> {
    let mut out = std::fs::File::create(path)?;
    writeln!(
        out,
        "finance_id,customer_name,department,match_type,total_amount,total_quantity,\
         unique_product_count,transaction_count,last_sale_date,days_since_last_sale,\
         activity_tier,debt_2023,debt_2024,debt_2025,debt_trend,debt_to_sales_ratio,\
         customer_tier,risk_score,risk_level"
    )?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{:.2},{},{},{},{},{},{},{:.2},{:.2},{:.2},{},{:.2},{},{},{}",
            csv_field(&r.finance_id),
            csv_field(&r.customer_name),
            csv_field(&r.department),
            r.match_type.as_str(),
            r.total_amount,
            r.total_quantity,
            r.unique_product_count,
            r.transaction_count,
            r.last_sale_date.map(|d| d.to_string()).unwrap_or_default(),
            r.days_since_last_sale.map(|d| d.to_string()).unwrap_or_default(),
            r.activity_tier.as_str(),
            r.debt_2023,
            r.debt_2024,
            r.debt_2025,
            csv_field(&r.debt_trend),
            r.debt_to_sales_ratio,
            r.customer_tier.as_str(),
            r.risk_score,
            r.risk_level.as_str()
        )?;
    }
    Ok(())
}

/// Quote a field when it contains a delimiter or quote.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    str_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
