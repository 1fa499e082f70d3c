//! # Verdicts and Report Aggregation
//!
//! Output types shared by both evaluation paths, and the aggregator that
//! partitions per-rule verdicts into the category-grouped compliance
//! report.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{self, RuleCategory};

/// Generic advisory text used when neither the rule template nor the LLM
/// supplied a field. Verdict fields are never left empty.
pub const DEFAULT_REASON: &str = "未提供分析原因";
pub const DEFAULT_DETAILS: &str = "未提供检测依据";
pub const DEFAULT_IMPROVEMENTS: &str = "建议加强相关制度建设和信息披露";
pub const DEFAULT_FUTURE_DIRECTION: &str = "持续关注行业发展趋势，制定长期战略规划";
pub const DEFAULT_RISK_ALERT: &str = "需要关注相关合规风险，建立预警机制";
pub const DEFAULT_INDUSTRY_BENCHMARK: &str = "参考行业领先企业的最佳实践";

/// Tri-state outcome of evaluating one rule. No partial or numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Passed,
    Warning,
    Failed,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }

    /// Parse a status from untrusted input. Anything unrecognised becomes
    /// `Warning` — the LLM response boundary must not produce surprises.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "warning" => Self::Warning,
            other => {
                tracing::warn!(status = other, "unknown rule status, defaulting to warning");
                Self::Warning
            }
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of evaluating one rule against one analysis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleVerdict {
    /// Rule id, copied from the catalog.
    pub id: String,
    /// Display name, copied from the catalog (or the LLM when it renames).
    pub name: String,
    pub status: RuleStatus,
    /// Free-text justification for the status.
    pub reason: String,
    /// Evidentiary basis — what the text did or did not contain.
    pub details: String,
    pub improvements: String,
    pub future_direction: String,
    pub risk_alert: String,
    pub industry_benchmark: String,
}

/// Per-category slice of a compliance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryReport {
    /// `round(100 × passed / total)` over this category's rules; 0 when
    /// the category evaluated no rules.
    pub rate: i32,
    pub rules: Vec<RuleVerdict>,
}

impl CategoryReport {
    fn from_rules(rules: Vec<RuleVerdict>) -> Self {
        Self {
            rate: pass_rate(&rules),
            rules,
        }
    }
}

/// Overall pass/warning/failure counts across all evaluated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverallSummary {
    pub rate: i32,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// The three fixed category slices of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryReports {
    pub environmental: CategoryReport,
    pub social: CategoryReport,
    pub governance: CategoryReport,
}

/// The aggregated, category-partitioned result of one compliance check.
///
/// Invariant: `overall.passed + overall.warnings + overall.failed` equals
/// the total number of evaluated rules, and the three category rule lists
/// partition the overall rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComplianceReport {
    pub overall: OverallSummary,
    pub categories: CategoryReports,
}

impl ComplianceReport {
    /// Total number of rules evaluated across all categories.
    pub fn total_rules(&self) -> usize {
        self.overall.passed + self.overall.warnings + self.overall.failed
    }
}

/// `round(100 × passed / total)`, with 0 for an empty slice — never a
/// division by zero, never NaN.
fn pass_rate(rules: &[RuleVerdict]) -> i32 {
    if rules.is_empty() {
        return 0;
    }
    let passed = rules.iter().filter(|r| r.status == RuleStatus::Passed).count();
    ((passed as f64 / rules.len() as f64) * 100.0).round() as i32
}

/// Group per-rule verdicts by catalog category and shape the final report.
///
/// Category membership is derived by re-joining each verdict's id against
/// the catalog — verdicts do not carry a category themselves. A verdict
/// whose id is not in the catalog is dropped with a warning; both
/// evaluation paths already filter to catalog rules, so this only fires on
/// a programming error.
pub fn aggregate(verdicts: Vec<RuleVerdict>) -> ComplianceReport {
    let mut environmental = Vec::new();
    let mut social = Vec::new();
    let mut governance = Vec::new();

    for verdict in verdicts {
        match catalog::find(&verdict.id).map(|def| def.category) {
            Some(RuleCategory::Environmental) => environmental.push(verdict),
            Some(RuleCategory::Social) => social.push(verdict),
            Some(RuleCategory::Governance) => governance.push(verdict),
            None => {
                tracing::warn!(rule_id = %verdict.id, "verdict for unknown rule id dropped");
            }
        }
    }

    let total = environmental.len() + social.len() + governance.len();
    let count = |status: RuleStatus| {
        environmental
            .iter()
            .chain(social.iter())
            .chain(governance.iter())
            .filter(|r| r.status == status)
            .count()
    };
    let passed = count(RuleStatus::Passed);
    let warnings = count(RuleStatus::Warning);
    let failed = count(RuleStatus::Failed);

    let rate = if total > 0 {
        ((passed as f64 / total as f64) * 100.0).round() as i32
    } else {
        0
    };

    ComplianceReport {
        overall: OverallSummary {
            rate,
            passed,
            warnings,
            failed,
        },
        categories: CategoryReports {
            environmental: CategoryReport::from_rules(environmental),
            social: CategoryReport::from_rules(social),
            governance: CategoryReport::from_rules(governance),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(id: &str, status: RuleStatus) -> RuleVerdict {
        RuleVerdict {
            id: id.to_string(),
            name: id.to_string(),
            status,
            reason: DEFAULT_REASON.to_string(),
            details: DEFAULT_DETAILS.to_string(),
            improvements: DEFAULT_IMPROVEMENTS.to_string(),
            future_direction: DEFAULT_FUTURE_DIRECTION.to_string(),
            risk_alert: DEFAULT_RISK_ALERT.to_string(),
            industry_benchmark: DEFAULT_INDUSTRY_BENCHMARK.to_string(),
        }
    }

    #[test]
    fn empty_verdicts_yield_zero_rates() {
        let report = aggregate(vec![]);
        assert_eq!(report.overall.rate, 0);
        assert_eq!(report.total_rules(), 0);
        assert_eq!(report.categories.environmental.rate, 0);
    }

    #[test]
    fn counts_sum_to_total() {
        let report = aggregate(vec![
            verdict("e1", RuleStatus::Passed),
            verdict("e3", RuleStatus::Warning),
            verdict("s1", RuleStatus::Failed),
            verdict("g1", RuleStatus::Passed),
        ]);
        assert_eq!(report.overall.passed, 2);
        assert_eq!(report.overall.warnings, 1);
        assert_eq!(report.overall.failed, 1);
        assert_eq!(report.total_rules(), 4);

        let per_category = report.categories.environmental.rules.len()
            + report.categories.social.rules.len()
            + report.categories.governance.rules.len();
        assert_eq!(per_category, 4);
    }

    #[test]
    fn rate_rounds_half_up() {
        // 1 of 3 passed → 33.33… → 33; 2 of 3 → 66.67 → 67.
        let report = aggregate(vec![
            verdict("e1", RuleStatus::Passed),
            verdict("e2", RuleStatus::Warning),
            verdict("e3", RuleStatus::Warning),
        ]);
        assert_eq!(report.overall.rate, 33);

        let report = aggregate(vec![
            verdict("e1", RuleStatus::Passed),
            verdict("e2", RuleStatus::Passed),
            verdict("e3", RuleStatus::Warning),
        ]);
        assert_eq!(report.overall.rate, 67);
    }

    #[test]
    fn category_rate_is_independent_of_other_categories() {
        let report = aggregate(vec![
            verdict("e1", RuleStatus::Passed),
            verdict("s1", RuleStatus::Failed),
        ]);
        assert_eq!(report.categories.environmental.rate, 100);
        assert_eq!(report.categories.social.rate, 0);
        assert_eq!(report.overall.rate, 50);
    }

    #[test]
    fn unknown_verdict_id_is_dropped() {
        let report = aggregate(vec![
            verdict("e1", RuleStatus::Passed),
            verdict("nonexistent", RuleStatus::Passed),
        ]);
        assert_eq!(report.total_rules(), 1);
    }

    #[test]
    fn status_lenient_parse_defaults_to_warning() {
        assert_eq!(RuleStatus::parse_lenient("passed"), RuleStatus::Passed);
        assert_eq!(RuleStatus::parse_lenient("PASSED"), RuleStatus::Warning);
        assert_eq!(RuleStatus::parse_lenient("ok"), RuleStatus::Warning);
    }

    #[test]
    fn report_serializes_camel_case_verdicts() {
        let report = aggregate(vec![verdict("g4", RuleStatus::Warning)]);
        let json = serde_json::to_value(&report).unwrap();
        let rule = &json["categories"]["governance"]["rules"][0];
        assert!(rule.get("futureDirection").is_some());
        assert!(rule.get("riskAlert").is_some());
        assert!(rule.get("industryBenchmark").is_some());
        assert_eq!(json["overall"]["rate"], 0);
    }
}
