//! ESG dimension scores.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scores for the three ESG dimensions plus the producer's overall figure.
///
/// Scores are conventionally in `[0, 10]` but are not clamped here — a
/// producer (the LLM, the keyword estimator) may emit anything, and the
/// compliance evaluators are specified to be total over arbitrary values.
/// `overall` is whatever the producer reported; it is not recomputed from
/// the three dimensions.
///
/// Every field defaults to `0.0` so a record whose stored scores are
/// missing or partial still evaluates (all threshold rules fail low).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EsgScores {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
    pub overall: f64,
}

impl EsgScores {
    /// Construct scores with an explicit overall figure.
    pub fn new(environmental: f64, social: f64, governance: f64, overall: f64) -> Self {
        Self {
            environmental,
            social,
            governance,
            overall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let scores: EsgScores = serde_json::from_str(r#"{"environmental": 8.5}"#).unwrap();
        assert_eq!(scores.environmental, 8.5);
        assert_eq!(scores.social, 0.0);
        assert_eq!(scores.governance, 0.0);
        assert_eq!(scores.overall, 0.0);
    }

    #[test]
    fn empty_object_deserializes() {
        let scores: EsgScores = serde_json::from_str("{}").unwrap();
        assert_eq!(scores, EsgScores::default());
    }
}
