//! # ESG Text Analysis
//!
//! Sends user-submitted text to DeepSeek for entity extraction, ESG
//! dimension scoring, insights, and risk assessment.
//!
//! The pipeline degrades in two stages and therefore never errors:
//!
//! 1. The model's response contains a parseable JSON object → use it
//!    (`source: deepseek-api`).
//! 2. The response is present but unusable → estimate scores from
//!    keywords in the response text (`source: deepseek-api-parsed`).
//! 3. The call itself failed → fixed local analysis
//!    (`source: local-backup`).

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use esglens_core::{AnalysisSource, AnalysisStatus, Entity, EsgScores, RiskItem, RiskLevel};

use crate::chat::{ChatClient, ChatMessage, ChatOptions};
use crate::config::DeepSeekConfig;

/// An analysis result before persistence assigns it an id and timestamp.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub entities: Vec<Entity>,
    pub esg_scores: EsgScores,
    pub key_insights: Vec<String>,
    pub risks: Vec<RiskItem>,
    pub recommendations: Vec<String>,
    pub status: AnalysisStatus,
    pub source: AnalysisSource,
}

const ANALYSIS_SYSTEM_PROMPT: &str = r#"你是一个专业的ESG（环境、社会、治理）分析专家。请对提供的文本进行全面的ESG分析，并以JSON格式返回结果。

分析要求：
1. 识别文本中的关键实体（公司名称、报告类型、年份等）
2. 对环境(E)、社会(S)、治理(G)三个维度进行评分（0-10分）
3. 提取关键洞察和发现
4. 评估潜在风险等级
5. 计算综合ESG评分

请严格按照以下JSON格式返回结果：
{
  "entities": [
    {"type": "公司名称", "value": "具体公司名", "confidence": 0.95}
  ],
  "esgScores": {
    "environmental": 8.5,
    "social": 7.8,
    "governance": 8.9,
    "overall": 8.4
  },
  "keyInsights": [
    "具体的分析洞察"
  ],
  "risks": [
    {"level": "high/medium/low", "description": "风险描述"}
  ],
  "status": "completed"
}"#;

/// Analyse one input text. Total — every failure mode degrades to a
/// usable outcome rather than an error.
pub async fn analyze_text(
    client: &dyn ChatClient,
    config: &DeepSeekConfig,
    text: &str,
) -> AnalysisOutcome {
    let messages = [
        ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(format!("请分析以下文本的ESG表现：\n\n{text}")),
    ];
    let options = ChatOptions {
        temperature: 0.3,
        max_tokens: 2000,
        timeout: config.timeout,
        max_retries: config.max_retries,
    };

    match client.complete(&messages, options).await {
        Ok(content) => match parse_analysis_response(&content) {
            Some(outcome) => {
                tracing::info!("DeepSeek analysis response parsed");
                outcome
            }
            None => {
                tracing::warn!("DeepSeek analysis response unparseable, estimating from keywords");
                keyword_estimate(&content, text)
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "DeepSeek analysis call failed, using local backup");
            local_backup(text)
        }
    }
}

// ─── Primary parse path ─────────────────────────────────────────────────

/// Untrusted payload shapes for the model's JSON. Every field defaults so
/// a partially-conforming response still yields an outcome.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    entities: Vec<RawEntity>,
    #[serde(default)]
    esg_scores: EsgScores,
    #[serde(default)]
    key_insights: Vec<String>,
    #[serde(default)]
    risks: Vec<RawRisk>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
struct RawRisk {
    #[serde(default)]
    level: String,
    #[serde(default)]
    description: String,
}

fn parse_analysis_response(content: &str) -> Option<AnalysisOutcome> {
    let json_str = extract_json_object(content).unwrap_or(content);
    let raw: RawAnalysis = serde_json::from_str(json_str).ok()?;

    let entities = raw
        .entities
        .into_iter()
        .map(|e| Entity::new(e.entity_type, e.value, e.confidence.clamp(0.0, 1.0)))
        .collect();
    let risks = raw
        .risks
        .into_iter()
        .map(|r| RiskItem::new(RiskLevel::parse_lenient(&r.level), r.description))
        .collect();

    Some(AnalysisOutcome {
        entities,
        esg_scores: raw.esg_scores,
        key_insights: raw.key_insights,
        risks,
        recommendations: raw.recommendations,
        status: AnalysisStatus::Completed,
        source: AnalysisSource::DeepseekApi,
    })
}

/// Extract the outermost JSON-object-shaped substring: first `{` through
/// last `}`. Tolerates markdown fences and prose around the object.
pub(crate) fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

// ─── Keyword estimation (unusable response body) ────────────────────────

const ENV_KEYWORDS: [&str; 6] = ["环境", "碳排放", "节能", "绿色", "可持续", "环保"];
const SOCIAL_KEYWORDS: [&str; 7] = ["员工", "社会", "公益", "慈善", "社区", "健康", "安全"];
const GOV_KEYWORDS: [&str; 6] = ["治理", "董事会", "合规", "透明", "监督", "风险管理"];

/// Base score plus half a point per matched keyword, capped at +2.0.
fn keyword_score(text: &str, keywords: &[&str]) -> f64 {
    let matches = keywords.iter().filter(|k| text.contains(*k)).count();
    let bonus = (matches as f64 * 0.5).min(2.0);
    round1(6.0 + bonus)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn keyword_estimate(response_text: &str, original_text: &str) -> AnalysisOutcome {
    let mut entities = Vec::new();
    if let Some(company) = match_company(original_text) {
        entities.push(Entity::new("公司名称", company, 0.85));
    }
    if let Some(year) = match_report_year(original_text) {
        entities.push(Entity::new("报告年份", format!("{year}年"), 0.80));
    }

    let environmental = keyword_score(response_text, &ENV_KEYWORDS);
    let social = keyword_score(response_text, &SOCIAL_KEYWORDS);
    let governance = keyword_score(response_text, &GOV_KEYWORDS);
    let overall = round1((environmental + social + governance) / 3.0);

    AnalysisOutcome {
        entities,
        esg_scores: EsgScores::new(environmental, social, governance, overall),
        key_insights: extract_insights(response_text),
        risks: assess_risks(environmental, social, governance),
        recommendations: vec![],
        status: AnalysisStatus::Completed,
        source: AnalysisSource::DeepseekApiParsed,
    }
}

fn extract_insights(text: &str) -> Vec<String> {
    let mut insights = Vec::new();
    if text.contains("环境") || text.contains("绿色") {
        insights.push("公司在环境保护方面有相关举措".to_string());
    }
    if text.contains("员工") || text.contains("社会") {
        insights.push("公司注重社会责任和员工权益".to_string());
    }
    if text.contains("治理") || text.contains("管理") {
        insights.push("公司具备一定的治理结构".to_string());
    }
    if insights.is_empty() {
        insights.push("基于文本内容进行了ESG分析".to_string());
    }
    insights
}

fn assess_risks(environmental: f64, social: f64, governance: f64) -> Vec<RiskItem> {
    let mut risks = Vec::new();
    if environmental < 7.0 {
        risks.push(RiskItem::new(RiskLevel::Medium, "环境风险需要关注"));
    }
    if social < 7.0 {
        risks.push(RiskItem::new(RiskLevel::Medium, "社会责任风险需要关注"));
    }
    if governance < 7.0 {
        risks.push(RiskItem::new(RiskLevel::Medium, "治理风险需要关注"));
    }
    if risks.is_empty() {
        risks.push(RiskItem::new(RiskLevel::Low, "整体ESG风险较低"));
    }
    risks
}

// ─── Local backup (call failed) ─────────────────────────────────────────

fn local_backup(text: &str) -> AnalysisOutcome {
    let mut entities = Vec::new();
    if let Some(company) = match_company(text) {
        entities.push(Entity::new("公司名称", company, 0.80));
    }

    AnalysisOutcome {
        entities,
        esg_scores: EsgScores::new(7.5, 7.2, 7.8, 7.5),
        key_insights: vec![
            "基于本地分析的ESG评估".to_string(),
            "建议进一步完善ESG信息披露".to_string(),
            "整体ESG表现处于中等水平".to_string(),
        ],
        risks: vec![RiskItem::new(RiskLevel::Medium, "需要加强ESG信息透明度")],
        recommendations: vec![],
        status: AnalysisStatus::Completed,
        source: AnalysisSource::LocalBackup,
    }
}

// ─── Entity regexes ─────────────────────────────────────────────────────

fn company_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Z][a-z]*(?:\s+[A-Z][a-z]*)*(?:公司|集团|股份|有限|Corporation|Corp|Inc|Ltd)")
            .expect("company regex is valid")
    })
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"20\d{2}").expect("year regex is valid"))
}

/// First company-shaped mention in the text, if any.
fn match_company(text: &str) -> Option<&str> {
    company_regex().find(text).map(|m| m.as_str())
}

/// Last four-digit year in the text — reports usually cite older years
/// before the reporting year.
fn match_report_year(text: &str) -> Option<&str> {
    year_regex().find_iter(text).last().map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeepSeekError;
    use async_trait::async_trait;

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
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    fn config() -> DeepSeekConfig {
        DeepSeekConfig::new("sk-test", "https://api.deepseek.com")
    }

    #[tokio::test]
    async fn well_formed_response_parses_as_deepseek_api() {
        let client = ScriptedClient {
            response: Some(
                r#"```json
{"entities":[{"type":"公司名称","value":"Acme Corp","confidence":0.95}],
 "esgScores":{"environmental":8.5,"social":7.8,"governance":8.9,"overall":8.4},
 "keyInsights":["碳排放管理完善"],
 "risks":[{"level":"low","description":"整体风险较低"}],
 "status":"completed"}
```"#
                    .to_string(),
            ),
        };
        let outcome = analyze_text(&client, &config(), "Acme Corp 2023年报告").await;
        assert_eq!(outcome.source, AnalysisSource::DeepseekApi);
        assert_eq!(outcome.esg_scores.environmental, 8.5);
        assert_eq!(outcome.entities[0].value, "Acme Corp");
        assert_eq!(outcome.risks[0].level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn unparseable_response_estimates_from_keywords() {
        let client = ScriptedClient {
            response: Some("该公司在环境保护和员工权益方面表现良好，治理结构健全。".to_string()),
        };
        let outcome = analyze_text(&client, &config(), "Acme集团2022年度可持续发展报告").await;
        assert_eq!(outcome.source, AnalysisSource::DeepseekApiParsed);
        assert!(outcome.esg_scores.environmental >= 6.0);
        assert!(!outcome.key_insights.is_empty());
        assert!(!outcome.risks.is_empty());
        // Entities come from the original text, not the response.
        assert_eq!(outcome.entities[0].value, "Acme集团");
        assert_eq!(outcome.entities[1].value, "2022年");
    }

    #[tokio::test]
    async fn failed_call_uses_local_backup() {
        let client = ScriptedClient { response: None };
        let outcome = analyze_text(&client, &config(), "一段没有公司名的文本").await;
        assert_eq!(outcome.source, AnalysisSource::LocalBackup);
        assert_eq!(outcome.esg_scores.environmental, 7.5);
        assert_eq!(outcome.esg_scores.overall, 7.5);
        assert!(outcome.entities.is_empty());
    }

    #[test]
    fn extract_json_object_spans_first_to_last_brace() {
        assert_eq!(extract_json_object("prefix {\"a\":1} suffix"), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(
            extract_json_object("{\"a\":{\"b\":2}} trailing"),
            Some("{\"a\":{\"b\":2}}")
        );
    }

    #[test]
    fn keyword_score_caps_bonus_at_two() {
        let text = "环境 碳排放 节能 绿色 可持续 环保";
        assert_eq!(keyword_score(text, &ENV_KEYWORDS), 8.0);
        assert_eq!(keyword_score("无关内容", &ENV_KEYWORDS), 6.0);
    }

    #[test]
    fn company_regex_requires_latin_prefix_and_adjacent_suffix() {
        assert_eq!(match_company("AcmeCorp成立于2010年"), Some("AcmeCorp"));
        assert_eq!(match_company("New Horizon集团发布报告"), Some("New Horizon集团"));
        // A purely Chinese name has no Latin prefix and does not match.
        assert_eq!(match_company("绿能科技股份有限公司发布报告"), None);
        // The suffix must be adjacent to the Latin words.
        assert_eq!(match_company("Acme Inc"), None);
    }

    #[test]
    fn report_year_takes_last_match() {
        assert_eq!(match_report_year("对比2021年，2023年排放下降"), Some("2023"));
        assert_eq!(match_report_year("无年份"), None);
    }
}
