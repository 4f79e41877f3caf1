//! Customer tiering and risk scoring over merged records.
//!
//! The tier table is an ordered list of guard conditions, not a dispatch
//! table: conditions are not mutually exclusive in declaration order, and
//! the order decides boundary values. A debt-to-sales ratio of exactly 20
//! or exactly 50 falls in the medium band.

use crate::{
    aggregate::ActivityTier,
    config::ClassifierConfig,
    matching::MatchType,
    merge::MergedRecord,
};
use serde::{Deserialize, Serialize};

/// Trend label the debt ledger supplies for customers whose debt carried
/// across all tracked years.
pub const PERSISTENT_DEBT_TREND: &str = "persistent_debt";

/// The customer tier taxonomy. Labels are serialized exactly as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerTier {
    #[serde(rename = "A-premium-large")]
    APremiumLarge,
    #[serde(rename = "A-premium-active")]
    APremiumActive,
    #[serde(rename = "B-dormant-large")]
    BDormantLarge,
    #[serde(rename = "B-general")]
    BGeneral,
    #[serde(rename = "B1-low-risk-active-debt")]
    B1LowRiskActiveDebt,
    #[serde(rename = "B2-low-risk-debt")]
    B2LowRiskDebt,
    #[serde(rename = "C-small")]
    CSmall,
    #[serde(rename = "C1-medium-risk-persistent")]
    C1MediumRiskPersistent,
    #[serde(rename = "C2-medium-risk-debt")]
    C2MediumRiskDebt,
    #[serde(rename = "D-no-sales-no-debt")]
    DNoSalesNoDebt,
    #[serde(rename = "D1-high-risk-persistent")]
    D1HighRiskPersistent,
    #[serde(rename = "D2-high-risk-debt")]
    D2HighRiskDebt,
    #[serde(rename = "E-debt-only")]
    EDebtOnly,
    #[serde(rename = "incomplete-data")]
    IncompleteData,
}

impl CustomerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::APremiumLarge => "A-premium-large",
            CustomerTier::APremiumActive => "A-premium-active",
            CustomerTier::BDormantLarge => "B-dormant-large",
            CustomerTier::BGeneral => "B-general",
            CustomerTier::B1LowRiskActiveDebt => "B1-low-risk-active-debt",
            CustomerTier::B2LowRiskDebt => "B2-low-risk-debt",
            CustomerTier::CSmall => "C-small",
            CustomerTier::C1MediumRiskPersistent => "C1-medium-risk-persistent",
            CustomerTier::C2MediumRiskDebt => "C2-medium-risk-debt",
            CustomerTier::DNoSalesNoDebt => "D-no-sales-no-debt",
            CustomerTier::D1HighRiskPersistent => "D1-high-risk-persistent",
            CustomerTier::D2HighRiskDebt => "D2-high-risk-debt",
            CustomerTier::EDebtOnly => "E-debt-only",
            CustomerTier::IncompleteData => "incomplete-data",
        }
    }
}

/// Five risk buckets derived from the 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    ModerateLow,
    Moderate,
    ModerateHigh,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::ModerateLow => "moderate_low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::ModerateHigh => "moderate_high",
            RiskLevel::High => "high",
        }
    }
}

/// Assign the customer tier for one merged record.
pub fn customer_tier(rec: &MergedRecord, cfg: &ClassifierConfig) -> CustomerTier {
    let total_debt = rec.debt_2023 + rec.debt_2024 + rec.debt_2025;
    if rec.department.trim().is_empty() && rec.total_amount == 0.0 && total_debt == 0.0 {
        return CustomerTier::IncompleteData;
    }

    let has_current_debt = rec.debt_2025 > 0.0;
    let active = rec.activity_tier.is_active();

    if !has_current_debt {
        if rec.total_amount == 0.0 {
            return CustomerTier::DNoSalesNoDebt;
        }
        if rec.total_amount > cfg.premium_sales_threshold {
            return if active {
                CustomerTier::APremiumLarge
            } else {
                CustomerTier::BDormantLarge
            };
        }
        if rec.total_amount > cfg.general_sales_threshold {
            return if active {
                CustomerTier::APremiumActive
            } else {
                CustomerTier::BGeneral
            };
        }
        return CustomerTier::CSmall;
    }

    if rec.total_amount == 0.0 {
        return CustomerTier::EDebtOnly;
    }

    let ratio = rec.debt_to_sales_ratio;
    let persistent = rec.debt_trend == PERSISTENT_DEBT_TREND;

    if ratio < cfg.low_ratio_pct {
        return if rec.activity_tier == ActivityTier::Active30d {
            CustomerTier::B1LowRiskActiveDebt
        } else {
            CustomerTier::B2LowRiskDebt
        };
    }
    if ratio <= cfg.high_ratio_pct {
        return if persistent {
            CustomerTier::C1MediumRiskPersistent
        } else {
            CustomerTier::C2MediumRiskDebt
        };
    }
    if persistent {
        CustomerTier::D1HighRiskPersistent
    } else {
        CustomerTier::D2HighRiskDebt
    }
}

/// Compute the 0-100 risk score: starts at 100, monotonic deductions, one
/// credit for sales-only records, clamped at both ends.
pub fn risk_score(rec: &MergedRecord, cfg: &ClassifierConfig) -> i64 {
    let mut score: i64 = 100;

    // Current-year debt size: largest threshold wins, bands are exclusive.
    if rec.debt_2025 > cfg.large_debt_threshold {
        score -= 30;
    } else if rec.debt_2025 > cfg.mid_debt_threshold {
        score -= 20;
    } else if rec.debt_2025 > 0.0 {
        score -= 10;
    }

    match rec.activity_tier {
        ActivityTier::Dormant => score -= 15,
        ActivityTier::NoSalesRecord => score -= 25,
        _ => {}
    }

    if rec.debt_to_sales_ratio > cfg.high_ratio_pct {
        score -= 25;
    } else if rec.debt_to_sales_ratio > cfg.low_ratio_pct {
        score -= 15;
    }

    if rec.debt_trend == PERSISTENT_DEBT_TREND {
        score -= 10;
    }

    match rec.match_type {
        MatchType::DebtOnly => score -= 5,
        MatchType::SalesOnly => score += 5,
        _ => {}
    }

    score.clamp(0, 100)
}

/// Bucket a score into the five risk levels.
pub fn risk_level(score: i64) -> RiskLevel {
    if score >= 80 {
        RiskLevel::Low
    } else if score >= 60 {
        RiskLevel::ModerateLow
    } else if score >= 40 {
        RiskLevel::Moderate
    } else if score >= 20 {
        RiskLevel::ModerateHigh
    } else {
        RiskLevel::High
    }
}

/// Fill tier, score and level on every record.
pub fn apply(records: &mut [MergedRecord], cfg: &ClassifierConfig) {
    for rec in records.iter_mut() {
        rec.customer_tier = customer_tier(rec, cfg);
        rec.risk_score = risk_score(rec, cfg);
        rec.risk_level = risk_level(rec.risk_score);
    }
}
