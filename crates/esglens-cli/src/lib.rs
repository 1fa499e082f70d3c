//! # esglens-cli — Command-Line Interface
//!
//! Provides the `esglens` binary:
//!
//! - `esglens serve` — run the API server (requires `DATABASE_URL` and
//!   `DEEPSEEK_API_KEY`).
//! - `esglens check <record.json>` — offline deterministic compliance
//!   check of an analysis record, no network or database needed.
//! - `esglens rules` — print the compliance rule catalog.

pub mod check;
pub mod rules;
