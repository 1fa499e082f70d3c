//! # Deterministic Fallback Evaluator
//!
//! Keyword- and threshold-based compliance evaluation, used whenever the
//! LLM path is unavailable or returns an unusable response — and directly
//! by the offline CLI check.
//!
//! Pure function of the analysis record and the static catalog: no I/O, no
//! shared state, and total over its documented input domain. Arbitrary
//! scores (negative, zero, above 10) and empty input text are valid
//! inputs; unknown rule ids are skipped rather than failing the batch, so
//! a client submitting retired rule ids still gets verdicts for the rest.
//!
//! Each rule has its own status policy:
//!
//! - score-threshold rules (e1, e2, s1, g1) — three-way split on one ESG
//!   dimension with strict `>` comparisons and per-rule cut-offs;
//! - keyword rules (e3, e4, s2, s4, g2, g3) — `passed` when the text
//!   contains any of the rule's keywords, else `warning`, never `failed`;
//! - conjunctive rules (s3, g4) — a dimension floor AND a keyword hit.

use esglens_core::{AnalysisRecord, EsgScores};

use crate::catalog::{self, RuleDef};
use crate::report::{
    RuleStatus, RuleVerdict, DEFAULT_FUTURE_DIRECTION, DEFAULT_IMPROVEMENTS, DEFAULT_INDUSTRY_BENCHMARK,
    DEFAULT_RISK_ALERT,
};

use RuleStatus::{Failed, Passed, Warning};

/// Evaluate the requested rules against an analysis record.
///
/// `rule_ids` of `None` evaluates all 12 catalog rules. Ids not present in
/// the catalog are skipped with a warning. Returns exactly one verdict per
/// known requested id, in request order.
pub fn evaluate(record: &AnalysisRecord, rule_ids: Option<&[String]>) -> Vec<RuleVerdict> {
    let company = record.company_name();
    let scores = record.esg_scores;
    let text = record.input_text.as_str();

    let requested: Vec<&str> = match rule_ids {
        Some(ids) => ids.iter().map(String::as_str).collect(),
        None => catalog::all_ids().collect(),
    };

    requested
        .into_iter()
        .filter_map(|id| match catalog::find(id) {
            Some(def) => Some(evaluate_rule(def, &company, scores, text)),
            None => {
                tracing::warn!(rule_id = id, "unknown compliance rule id, skipping");
                None
            }
        })
        .collect()
}

/// Three-way threshold: strict `>` at both cut-offs.
fn threshold_status(score: f64, pass_above: f64, warn_above: f64) -> RuleStatus {
    if score > pass_above {
        Passed
    } else if score > warn_above {
        Warning
    } else {
        Failed
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Keyword rules never fail — absence of evidence is a warning, not a
/// violation.
fn keyword_status(text: &str, keywords: &[&str]) -> RuleStatus {
    if contains_any(text, keywords) {
        Passed
    } else {
        Warning
    }
}

/// Per-rule verdict pieces before defaults are applied.
struct Parts {
    status: RuleStatus,
    reason: String,
    details: String,
    improvements: Option<String>,
    future_direction: Option<String>,
    risk_alert: Option<String>,
    industry_benchmark: Option<String>,
}

impl Parts {
    fn new(status: RuleStatus, reason: String, details: &str) -> Self {
        Self {
            status,
            reason,
            details: details.to_string(),
            improvements: None,
            future_direction: None,
            risk_alert: None,
            industry_benchmark: None,
        }
    }
}

fn evaluate_rule(def: &RuleDef, company: &str, scores: EsgScores, text: &str) -> RuleVerdict {
    let parts = match def.id {
        "e1" => carbon_disclosure(company, scores, text),
        "e2" => energy_efficiency(company, scores, text),
        "e3" => waste_management(company, text),
        "e4" => water_management(company, text),
        "s1" => employee_safety(company, scores, text),
        "s2" => diversity_inclusion(company, text),
        "s3" => supply_chain_labor(company, scores, text),
        "s4" => community_engagement(company, text),
        "g1" => board_independence(company, scores, text),
        "g2" => anti_corruption(company, text),
        "g3" => executive_pay_transparency(company, text),
        "g4" => risk_management(company, scores, text),
        other => unreachable!("rule {other} is in the catalog but has no evaluator"),
    };

    RuleVerdict {
        id: def.id.to_string(),
        name: def.name.to_string(),
        status: parts.status,
        reason: parts.reason,
        details: parts.details,
        improvements: parts.improvements.unwrap_or_else(|| DEFAULT_IMPROVEMENTS.to_string()),
        future_direction: parts
            .future_direction
            .unwrap_or_else(|| DEFAULT_FUTURE_DIRECTION.to_string()),
        risk_alert: parts.risk_alert.unwrap_or_else(|| DEFAULT_RISK_ALERT.to_string()),
        industry_benchmark: parts
            .industry_benchmark
            .unwrap_or_else(|| DEFAULT_INDUSTRY_BENCHMARK.to_string()),
    }
}

// ─── Environmental ──────────────────────────────────────────────────────

fn carbon_disclosure(company: &str, scores: EsgScores, text: &str) -> Parts {
    let score = scores.environmental;
    let status = threshold_status(score, 7.0, 4.0);
    let reason = match status {
        Passed => format!(
            "{company}在碳排放披露方面表现优秀，ESG环境评分达到{score}/10，已建立完善的碳排放监测和报告体系，数据披露透明度高，符合国际标准要求。"
        ),
        Warning => format!(
            "{company}的碳排放披露存在改进空间，ESG环境评分为{score}/10，虽有基础披露但缺乏系统性和完整性，需要进一步提升数据质量和透明度。"
        ),
        Failed => format!(
            "{company}在碳排放披露方面存在重大缺陷，ESG环境评分仅为{score}/10，缺乏基本的碳排放数据披露，急需建立完整的碳排放监测、核算和报告体系。"
        ),
    };
    let details = if contains_any(text, &["碳排放", "温室气体"]) {
        "文本中包含碳排放、温室气体等相关关键词，显示企业对碳排放管理有一定认知和实践"
    } else {
        "文本中未发现明确的碳排放披露信息，缺乏具体的排放数据、减排目标或相关管理措施"
    };
    let improvements = match status {
        Passed => "建议进一步完善碳排放数据的第三方验证机制，加强供应链碳足迹管理，探索碳中和路径规划。",
        Warning => "建议建立完整的碳排放核算体系，设定科学的减排目标，加强数据收集和监测能力，提升披露频率和质量。",
        Failed => "建议立即启动碳排放基线调研，建立数据收集体系，制定减排目标和行动计划，参考GHG Protocol等国际标准。",
    };
    let risk_alert = if status == Failed {
        "高风险：面临碳税、碳边境调节机制等政策风险，可能影响国际贸易和投资吸引力，建议尽快制定应对策略。"
    } else {
        "中等风险：需关注碳价格波动、监管政策变化对业务的潜在影响，建立风险预警和应对机制。"
    };

    let mut parts = Parts::new(status, reason, details);
    parts.improvements = Some(improvements.to_string());
    parts.future_direction = Some(
        "未来3-5年应重点关注：1）实现碳中和目标路径规划；2）发展清洁能源和节能技术；3）建立碳资产管理体系；4）参与碳交易市场；5）推动供应链低碳转型。"
            .to_string(),
    );
    parts.risk_alert = Some(risk_alert.to_string());
    parts.industry_benchmark = Some(
        "参考行业领先企业如微软、苹果等的碳中和承诺和实践，学习CDP、SBTi等国际倡议的最佳实践，对标同行业头部企业的披露标准。"
            .to_string(),
    );
    parts
}

fn energy_efficiency(company: &str, scores: EsgScores, text: &str) -> Parts {
    let status = threshold_status(scores.environmental, 6.0, 3.0);
    let reason = match status {
        Passed => format!("{company}在能源使用效率方面达标，环境管理措施较为完善。"),
        Warning => format!("{company}的能源使用效率有待提升，建议制定更明确的节能目标和措施。"),
        Failed => format!("{company}在能源使用效率方面存在重大缺陷，缺乏有效的能源管理体系。"),
    };
    let details = if contains_any(text, &["节能", "能源效率"]) {
        "文本中提及节能或能源效率相关措施"
    } else {
        "文本中缺乏能源使用效率的具体信息"
    };
    Parts::new(status, reason, details)
}

fn waste_management(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["废弃物", "回收"]);
    let reason = match status {
        Passed => format!("{company}在废弃物管理方面有相关披露，显示了环境责任意识。"),
        _ => format!("{company}在废弃物管理方面的披露不够充分，建议加强废弃物处理和回收利用的信息披露。"),
    };
    let details = if contains_any(text, &["废弃物", "回收"]) {
        "文本中包含废弃物管理相关内容"
    } else {
        "文本中未发现废弃物管理的具体措施"
    };
    Parts::new(status, reason, details)
}

fn water_management(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["水资源", "节水"]);
    let reason = match status {
        Passed => format!("{company}在水资源管理方面有相关措施，体现了环境保护意识。"),
        _ => format!("{company}在水资源管理方面的披露不够充分，建议加强水资源使用效率和节水措施的信息披露。"),
    };
    let details = if contains_any(text, &["水资源", "节水"]) {
        "文本中包含水资源管理相关内容"
    } else {
        "文本中未发现水资源管理的具体措施"
    };
    Parts::new(status, reason, details)
}

// ─── Social ─────────────────────────────────────────────────────────────

fn employee_safety(company: &str, scores: EsgScores, text: &str) -> Parts {
    let score = scores.social;
    let status = threshold_status(score, 7.0, 4.0);
    let reason = match status {
        Passed => format!(
            "{company}在员工健康安全方面表现优秀，ESG社会评分为{score}/10，建立了完善的安全保障体系。"
        ),
        Warning => format!(
            "{company}的员工健康安全措施需要改进，ESG社会评分为{score}/10，建议加强安全培训和防护措施。"
        ),
        Failed => format!(
            "{company}在员工健康安全方面存在严重不足，ESG社会评分仅为{score}/10，急需建立完整的职业健康安全管理体系。"
        ),
    };
    let details = if contains_any(text, &["安全", "健康"]) {
        "文本中提及员工安全或健康相关措施"
    } else {
        "文本中缺乏员工健康安全的具体保障措施"
    };
    Parts::new(status, reason, details)
}

fn diversity_inclusion(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["多元化", "平等"]);
    let reason = match status {
        Passed => format!("{company}在多元化与包容性方面有积极表现，体现了企业的社会责任。"),
        _ => format!("{company}在多元化与包容性方面的披露有限，建议加强相关政策的制定和实施。"),
    };
    let details = if contains_any(text, &["多元化", "平等"]) {
        "文本中体现了多元化和包容性理念"
    } else {
        "文本中未明确体现多元化和包容性政策"
    };
    Parts::new(status, reason, details)
}

fn supply_chain_labor(company: &str, scores: EsgScores, text: &str) -> Parts {
    let has_keywords = contains_any(text, &["供应链", "供应商"]);
    let status = if scores.social > 6.0 && has_keywords {
        Passed
    } else {
        Warning
    };
    let reason = match status {
        Passed => format!("{company}对供应链劳工标准有相关管理措施，体现了负责任的供应链管理。"),
        _ => format!("{company}在供应链劳工标准方面需要加强管理，建议建立更完善的供应商评估和监督机制。"),
    };
    let details = if has_keywords {
        "文本中提及供应链管理相关内容"
    } else {
        "文本中缺乏供应链劳工标准的管理措施"
    };
    Parts::new(status, reason, details)
}

fn community_engagement(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["社区", "公益"]);
    let reason = match status {
        Passed => format!("{company}在社区参与方面有积极表现，体现了企业的社会责任担当。"),
        _ => format!("{company}在社区参与方面的披露有限，建议加强社区发展项目的参与和信息披露。"),
    };
    let details = if contains_any(text, &["社区", "公益"]) {
        "文本中体现了社区参与相关活动"
    } else {
        "文本中未明确体现社区参与和发展项目"
    };
    Parts::new(status, reason, details)
}

// ─── Governance ─────────────────────────────────────────────────────────

fn board_independence(company: &str, scores: EsgScores, text: &str) -> Parts {
    let score = scores.governance;
    let status = threshold_status(score, 7.0, 4.0);
    let reason = match status {
        Passed => format!(
            "{company}的董事会独立性良好，ESG治理评分为{score}/10，治理结构较为完善。"
        ),
        Warning => format!(
            "{company}的董事会独立性有待提升，ESG治理评分为{score}/10，建议增加独立董事比例。"
        ),
        Failed => format!(
            "{company}的董事会独立性存在重大缺陷，ESG治理评分仅为{score}/10，治理结构需要重大改革。"
        ),
    };
    let details = if contains_any(text, &["董事会", "独立董事"]) {
        "文本中提及董事会治理相关内容"
    } else {
        "文本中缺乏董事会独立性的具体信息"
    };
    Parts::new(status, reason, details)
}

fn anti_corruption(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["反腐", "廉洁", "合规"]);
    let reason = match status {
        Passed => format!("{company}建立了反腐败相关政策，体现了良好的商业道德标准。"),
        _ => format!("{company}在反腐败政策方面的披露不够明确，建议建立更完善的反腐败制度和培训体系。"),
    };
    let details = if contains_any(text, &["反腐", "廉洁", "合规"]) {
        "文本中体现了反腐败或合规管理措施"
    } else {
        "文本中未明确提及反腐败政策"
    };
    Parts::new(status, reason, details)
}

fn executive_pay_transparency(company: &str, text: &str) -> Parts {
    let status = keyword_status(text, &["薪酬", "高管"]);
    let reason = match status {
        Passed => format!("{company}在高管薪酬透明度方面有相关披露，体现了良好的治理透明度。"),
        _ => format!("{company}在高管薪酬透明度方面的披露不够充分，建议加强高管薪酬决定机制的透明度。"),
    };
    let details = if contains_any(text, &["薪酬", "高管"]) {
        "文本中提及高管薪酬相关内容"
    } else {
        "文本中缺乏高管薪酬透明度的具体信息"
    };
    Parts::new(status, reason, details)
}

fn risk_management(company: &str, scores: EsgScores, text: &str) -> Parts {
    let has_keyword = text.contains("风险");
    let status = if scores.governance > 6.0 && has_keyword {
        Passed
    } else {
        Warning
    };
    let reason = match status {
        Passed => format!("{company}建立了较为完善的风险管理体系，能够有效识别和控制各类风险。"),
        _ => format!("{company}的风险管理体系需要进一步完善，建议加强风险识别、评估和应对机制。"),
    };
    let details = if has_keyword {
        "文本中提及风险管理相关措施"
    } else {
        "文本中缺乏风险管理体系的具体描述"
    };
    Parts::new(status, reason, details)
}
