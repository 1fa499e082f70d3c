//! # LLM-Backed Compliance Evaluator
//!
//! Attempts a structured rule-by-rule verdict from DeepSeek, with
//! unconditional delegation to the deterministic evaluator when the call
//! or its JSON parsing fails. Partial LLM results are never mixed with
//! fallback results for the same check — a failure anywhere in the model
//! path re-evaluates the full rule set deterministically.
//!
//! The parsed response is treated as an untrusted payload: fields are
//! validated one by one with explicit defaults, verdicts for unknown rule
//! ids are discarded, and unknown status strings degrade to `warning`.

use std::time::Duration;

use serde::Deserialize;

use esglens_core::AnalysisRecord;
use esglens_rules::catalog::{self, Rule};
use esglens_rules::report::{
    aggregate, ComplianceReport, RuleStatus, RuleVerdict, DEFAULT_DETAILS, DEFAULT_FUTURE_DIRECTION,
    DEFAULT_IMPROVEMENTS, DEFAULT_INDUSTRY_BENCHMARK, DEFAULT_REASON, DEFAULT_RISK_ALERT,
};
use esglens_rules::fallback;

use crate::analysis::extract_json_object;
use crate::chat::{ChatClient, ChatMessage, ChatOptions};
use crate::error::DeepSeekError;

/// Compliance calls analyse long documents — they get a longer timeout
/// and fewer retries than the analysis path.
const COMPLIANCE_TIMEOUT: Duration = Duration::from_secs(120);
const COMPLIANCE_MAX_RETRIES: u32 = 1;

const COMPLIANCE_SYSTEM_PROMPT: &str = r#"你是一个资深的ESG合规检测专家，拥有丰富的企业可持续发展评估经验。请对企业文本进行全面深入的合规分析，并严格按照JSON格式返回结果。

分析要求：
1. 深度解读企业文本内容，识别显性和隐性的ESG信息
2. 结合ESG评分和行业最佳实践进行综合判断
3. 提供详细的分析逻辑和证据支撑
4. 给出具体可行的改进建议和未来发展方向
5. 识别潜在风险和机遇
6. 状态分类：passed（合规优秀）、warning（需要关注）、failed（不合规）

请严格按照以下JSON格式返回，不要添加任何其他文字：
{
  "rules": [
    {
      "id": "规则ID",
      "name": "规则名称",
      "status": "passed/warning/failed",
      "reason": "深入分析该规则的合规状况，包括当前表现、行业对标、关键优势或不足",
      "details": "具体的文本证据、数据支撑和评估依据",
      "improvements": "针对性的改进建议和具体实施路径",
      "futureDirection": "未来3-5年的发展方向和战略建议",
      "riskAlert": "潜在风险预警和应对策略",
      "industryBenchmark": "行业标杆对比和最佳实践参考"
    }
  ]
}"#;

/// Failures of the model path. Every variant routes to the deterministic
/// fallback; none are surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum LlmEvaluationError {
    #[error(transparent)]
    Client(#[from] DeepSeekError),
    #[error(transparent)]
    Parse(#[from] ResponseParseError),
}

/// Errors from parsing the model's compliance response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    /// No `{…}` substring anywhere in the response.
    #[error("no JSON object found in response")]
    NoJsonObject,
    /// A JSON object was present but did not parse as the expected shape.
    #[error("invalid JSON in response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Run a compliance check for one analysis record.
///
/// `custom_rules` carries the client's rule configuration; only entries
/// with `enabled == true` are evaluated. `None` evaluates all 12 catalog
/// rules. Infallible: the deterministic evaluator covers every model-path
/// failure.
pub async fn evaluate_via_llm(
    client: &dyn ChatClient,
    record: &AnalysisRecord,
    custom_rules: Option<&[Rule]>,
) -> ComplianceReport {
    let enabled_ids: Option<Vec<String>> = custom_rules.map(|rules| {
        rules
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.id.clone())
            .collect()
    });

    match llm_verdicts(client, record, enabled_ids.as_deref()).await {
        Ok(verdicts) => {
            tracing::info!(verdicts = verdicts.len(), "LLM compliance evaluation succeeded");
            aggregate(verdicts)
        }
        Err(err) => {
            tracing::warn!(error = %err, "LLM compliance evaluation failed, using deterministic fallback");
            aggregate(fallback::evaluate(record, enabled_ids.as_deref()))
        }
    }
}

async fn llm_verdicts(
    client: &dyn ChatClient,
    record: &AnalysisRecord,
    enabled_ids: Option<&[String]>,
) -> Result<Vec<RuleVerdict>, LlmEvaluationError> {
    let messages = [
        ChatMessage::system(COMPLIANCE_SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(record, enabled_ids)),
    ];
    let options = ChatOptions {
        temperature: 0.2,
        max_tokens: 3000,
        timeout: COMPLIANCE_TIMEOUT,
        max_retries: COMPLIANCE_MAX_RETRIES,
    };

    let content = client.complete(&messages, options).await?;
    Ok(parse_rule_verdicts(&content)?)
}

fn build_user_prompt(record: &AnalysisRecord, enabled_ids: Option<&[String]>) -> String {
    let scores = record.esg_scores;

    let defs: Vec<_> = match enabled_ids {
        Some(ids) => ids.iter().filter_map(|id| catalog::find(id)).collect(),
        None => catalog::CATALOG.iter().collect(),
    };
    let rules_text = defs
        .iter()
        .map(|def| format!("- {}: {} - {}", def.id, def.name, def.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "企业名称：{company}\nESG评分：环境{env}/10，社会{social}/10，治理{gov}/10\n\n需要检测的合规规则：\n{rules_text}\n\n企业文本内容：\n{text}\n\n请对每个规则进行详细分析并返回JSON结果。",
        company = record.company_name(),
        env = scores.environmental,
        social = scores.social,
        gov = scores.governance,
        text = record.input_text,
    )
}

// ─── Untrusted response parsing ─────────────────────────────────────────

#[derive(Deserialize)]
struct RawComplianceResponse {
    /// A present-but-missing `rules` key parses as an empty list — the
    /// check then reports zero rules rather than falling back (see
    /// DESIGN.md).
    #[serde(default)]
    rules: Vec<RawVerdict>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    improvements: Option<String>,
    #[serde(default)]
    future_direction: Option<String>,
    #[serde(default)]
    risk_alert: Option<String>,
    #[serde(default)]
    industry_benchmark: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse the model's response text into verdicts.
///
/// Extraction and parse failures are errors (the caller falls back);
/// verdicts whose `id` is not in the catalog are discarded, symmetric
/// with the deterministic evaluator's unknown-id policy.
pub fn parse_rule_verdicts(content: &str) -> Result<Vec<RuleVerdict>, ResponseParseError> {
    let json_str = extract_json_object(content).ok_or(ResponseParseError::NoJsonObject)?;
    let response: RawComplianceResponse = serde_json::from_str(json_str)?;

    let verdicts = response
        .rules
        .into_iter()
        .filter_map(|raw| {
            let Some(def) = catalog::find(&raw.id) else {
                tracing::warn!(rule_id = %raw.id, "discarding verdict for unknown rule id");
                return None;
            };
            let status = raw
                .status
                .as_deref()
                .map(RuleStatus::parse_lenient)
                .unwrap_or(RuleStatus::Warning);
            Some(RuleVerdict {
                id: def.id.to_string(),
                name: or_default(raw.name, def.name),
                status,
                reason: or_default(raw.reason, DEFAULT_REASON),
                details: or_default(raw.details, DEFAULT_DETAILS),
                improvements: or_default(raw.improvements, DEFAULT_IMPROVEMENTS),
                future_direction: or_default(raw.future_direction, DEFAULT_FUTURE_DIRECTION),
                risk_alert: or_default(raw.risk_alert, DEFAULT_RISK_ALERT),
                industry_benchmark: or_default(raw.industry_benchmark, DEFAULT_INDUSTRY_BENCHMARK),
            })
        })
        .collect();

    Ok(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use esglens_core::{AnalysisSource, AnalysisStatus, EsgScores};
    use uuid::Uuid;

    struct ScriptedClient {
        response: Option<String>,
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: ChatOptions,
        ) -> Result<String, DeepSeekError> {
            match &self.response {
                Some(content) => Ok(content.clone()),
                None => Err(DeepSeekError::Api {
                    endpoint: "test".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    fn record() -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            input_text: "公司建立了反腐败制度和风险管理体系".to_string(),
            file_name: None,
            entities: vec![],
            esg_scores: EsgScores::new(8.0, 3.0, 6.0, 5.7),
            key_insights: vec![],
            risks: vec![],
            recommendations: vec![],
            status: AnalysisStatus::Completed,
            source: AnalysisSource::DeepseekApi,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn malformed_response_falls_back_to_deterministic() {
        let client = ScriptedClient {
            response: Some("not json at all".to_string()),
        };
        let record = record();
        let via_llm = evaluate_via_llm(&client, &record, None).await;
        let deterministic = aggregate(fallback::evaluate(&record, None));
        assert_eq!(via_llm, deterministic);
        assert_eq!(via_llm.total_rules(), 12);
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_deterministic() {
        let client = ScriptedClient { response: None };
        let record = record();
        let via_llm = evaluate_via_llm(&client, &record, None).await;
        let deterministic = aggregate(fallback::evaluate(&record, None));
        assert_eq!(via_llm, deterministic);
    }

    #[tokio::test]
    async fn fallback_respects_enabled_rule_subset() {
        let client = ScriptedClient { response: None };
        let record = record();
        let mut rules: Vec<Rule> = catalog::CATALOG.iter().map(Rule::from).collect();
        for rule in &mut rules {
            rule.enabled = rule.id == "e1" || rule.id == "g2";
        }
        let report = evaluate_via_llm(&client, &record, Some(&rules)).await;
        assert_eq!(report.total_rules(), 2);
        assert_eq!(report.categories.environmental.rules.len(), 1);
        assert_eq!(report.categories.governance.rules.len(), 1);
        assert!(report.categories.social.rules.is_empty());
    }

    #[tokio::test]
    async fn model_verdicts_are_used_when_parseable() {
        let client = ScriptedClient {
            response: Some(
                r#"分析结果如下：
{"rules":[
  {"id":"e1","status":"passed","reason":"披露完整","details":"包含碳排放数据"},
  {"id":"g2","status":"failed","reason":"缺乏反腐败制度"},
  {"id":"zzz","status":"passed"}
]}"#
                .to_string(),
            ),
        };
        let report = evaluate_via_llm(&client, &record(), None).await;
        // zzz discarded; two catalog verdicts remain.
        assert_eq!(report.total_rules(), 2);
        assert_eq!(report.overall.passed, 1);
        assert_eq!(report.overall.failed, 1);

        let e1 = &report.categories.environmental.rules[0];
        assert_eq!(e1.reason, "披露完整");
        // Missing advisory fields filled with defaults, never empty.
        assert_eq!(e1.improvements, DEFAULT_IMPROVEMENTS);
        assert_eq!(e1.name, "碳排放披露");
    }

    #[tokio::test]
    async fn missing_rules_key_yields_empty_report() {
        let client = ScriptedClient {
            response: Some(r#"{"result": "ok"}"#.to_string()),
        };
        let report = evaluate_via_llm(&client, &record(), None).await;
        assert_eq!(report.total_rules(), 0);
        assert_eq!(report.overall.rate, 0);
    }

    #[test]
    fn parse_rejects_missing_json_object() {
        match parse_rule_verdicts("plain prose response") {
            Err(ResponseParseError::NoJsonObject) => {}
            other => panic!("expected NoJsonObject, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(matches!(
            parse_rule_verdicts("{not valid json}"),
            Err(ResponseParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn parse_defaults_unknown_status_to_warning() {
        let verdicts =
            parse_rule_verdicts(r#"{"rules":[{"id":"s1","status":"excellent"}]}"#).unwrap();
        assert_eq!(verdicts[0].status, RuleStatus::Warning);
        assert_eq!(verdicts[0].reason, DEFAULT_REASON);
    }

    #[test]
    fn prompt_lists_only_requested_rules() {
        let ids = vec!["e1".to_string(), "g4".to_string(), "nope".to_string()];
        let prompt = build_user_prompt(&record(), Some(&ids));
        assert!(prompt.contains("- e1: 碳排放披露"));
        assert!(prompt.contains("- g4: 风险管理体系"));
        assert!(!prompt.contains("- s1"));
        assert!(prompt.contains("环境8/10"));
    }
}
