//! ledgerlink-core: reconciles two independently maintained business
//! ledgers, sales transactions and accounts-receivable records, then
//! classifies every customer into a risk/value taxonomy.
//!
//! The two ledgers share a noisy join key (a finance id plus a free-text
//! customer name that is formatted differently on each side). The engine
//! resolves each debt row to at most one sales aggregate through a fixed
//! strategy cascade, merges both sides into one uniform record shape, and
//! scores the result.
//!
//! RULES:
//!   - The pipeline is a pure function over in-memory snapshots of the two
//!     tables. Re-running it on the same snapshots yields identical output.
//!   - Data-quality problems (blank amounts, missing departments) are
//!     coerced to defaults at the store boundary, never raised as errors.
//!   - Only the store talks to the database.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod matching;
pub mod merge;
pub mod rng;
pub mod similarity;
pub mod standardize;
pub mod store;
pub mod types;
