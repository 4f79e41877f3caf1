//! Shared primitive types used across the analysis engine.

/// A customer account code: the join key between the sales and debt ledgers.
/// Syntactically noisy (mixed delimiters), so it is compared verbatim.
pub type FinanceId = String;

/// Monetary amounts. Source ledgers contain blanks and typos; amounts are
/// coerced to 0.0 at the read boundary rather than propagated as errors.
pub type Money = f64;
