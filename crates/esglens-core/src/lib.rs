//! # esglens-core — Shared Domain Types
//!
//! Domain types shared across the esglens workspace: ESG scores, extracted
//! entities, risk items, and the analysis record that every downstream
//! component (compliance evaluators, persistence, API) consumes.
//!
//! The types here carry the external JSON shape of the platform — camelCase
//! field names on the wire, snake_case in Rust. Persistence row types live
//! in `esglens-api::db`; this crate stays free of I/O.

pub mod analysis;
pub mod error;
pub mod scores;

pub use analysis::{
    AnalysisRecord, AnalysisSource, AnalysisStatus, Entity, RiskItem, RiskLevel,
};
pub use error::ValidationError;
pub use scores::EsgScores;
