//! Analysis configuration.
//!
//! All thresholds default to the values the ledgers were calibrated
//! against; a JSON file can override any section for ad-hoc reruns.

use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Literal organizational prefixes stripped from customer names before
    /// comparison. Matched at the start of the string only, each applied at
    /// most once.
    pub known_prefixes: Vec<String>,
    /// Minimum sequence-similarity ratio for two names to be considered the
    /// same entity when neither contains the other.
    pub similarity_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            known_prefixes: vec!["鑫帅辉".to_string()],
            similarity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Sales volume above which a customer counts as large.
    pub premium_sales_threshold: f64,
    /// Sales volume above which a customer counts as mid-size.
    pub general_sales_threshold: f64,
    /// Current-year debt above which the heaviest score deduction applies.
    pub large_debt_threshold: f64,
    /// Current-year debt above which the middle score deduction applies.
    pub mid_debt_threshold: f64,
    /// Debt-to-sales ratio (percent) below which debt counts as low risk.
    pub low_ratio_pct: f64,
    /// Debt-to-sales ratio (percent) above which debt counts as high risk.
    pub high_ratio_pct: f64,
    /// Recency bands (days since last sale) for the activity tiers.
    pub active_days: i64,
    pub warm_days: i64,
    pub cool_days: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            premium_sales_threshold: 50_000.0,
            general_sales_threshold: 10_000.0,
            large_debt_threshold: 50_000.0,
            mid_debt_threshold: 10_000.0,
            low_ratio_pct: 20.0,
            high_ratio_pct: 50.0,
            active_days: 30,
            warm_days: 90,
            cool_days: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Window (days before the analysis anchor date) for the
    /// recent-transaction count in the customer drill-down.
    pub recent_window_days: i64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 90,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub matching: MatchingConfig,
    pub classifier: ClassifierConfig,
    pub lookup: LookupConfig,
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> AnalysisResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AnalysisError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| AnalysisError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
