//! # esglens-rules — Compliance Rule Engine
//!
//! The deterministic half of the two-tier compliance pipeline:
//!
//! - [`catalog`] — the fixed table of 12 disclosure rules (4 environmental,
//!   4 social, 4 governance) and the managed [`Rule`] type exposed through
//!   the rule-management API.
//! - [`fallback`] — the deterministic evaluator. Pure function of an
//!   analysis record and a rule-id subset; total over its input domain.
//! - [`report`] — verdict and report types plus category aggregation.
//!
//! The LLM-backed evaluator lives in `esglens-deepseek` and delegates here
//! whenever the model path fails; both paths produce the same
//! [`report::ComplianceReport`] shape.

pub mod catalog;
pub mod fallback;
pub mod report;

pub use catalog::{Rule, RuleCategory, RuleDef};
pub use fallback::evaluate;
pub use report::{aggregate, CategoryReport, ComplianceReport, RuleStatus, RuleVerdict};
