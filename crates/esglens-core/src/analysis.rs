//! # Analysis Records
//!
//! The stored result of scoring one input text: extracted entities, ESG
//! dimension scores, insights, risks, and provenance. Records are created
//! once per analysis request and never mutated afterwards; deletion
//! cascades to any compliance results referencing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::scores::EsgScores;

/// Entity types recognised as a company mention, in resolution priority order.
const COMPANY_ENTITY_TYPES: [&str; 3] = ["公司名称", "company", "organization"];

/// An entity mention extracted from the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Entity {
    /// Entity type label, e.g. `公司名称` or `报告年份`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The extracted value.
    pub value: String,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            confidence,
        }
    }
}

/// Severity level of an identified risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a level from untrusted input, defaulting to `Medium` for
    /// anything unrecognised. Used at the LLM response boundary where the
    /// payload shape is not guaranteed.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            "medium" => Self::Medium,
            other => {
                tracing::warn!(level = other, "unknown risk level, defaulting to medium");
                Self::Medium
            }
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single identified risk with its severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskItem {
    pub level: RiskLevel,
    pub description: String,
}

impl RiskItem {
    pub fn new(level: RiskLevel, description: impl Into<String>) -> Self {
        Self {
            level,
            description: description.into(),
        }
    }
}

/// Lifecycle status of an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Completed,
    Processing,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "completed" => Self::Completed,
            "processing" => Self::Processing,
            "failed" => Self::Failed,
            other => {
                tracing::warn!(status = other, "unknown analysis status, defaulting to completed");
                Self::Completed
            }
        }
    }
}

/// Which evaluation path produced the analysis scores.
///
/// - `DeepseekApi` — the model returned well-formed JSON.
/// - `DeepseekApiParsed` — the model responded but its JSON was unusable;
///   scores were estimated from keywords in the response text.
/// - `LocalBackup` — the API call itself failed; fixed local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AnalysisSource {
    #[serde(rename = "deepseek-api")]
    DeepseekApi,
    #[serde(rename = "deepseek-api-parsed")]
    DeepseekApiParsed,
    #[serde(rename = "local-backup")]
    LocalBackup,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepseekApi => "deepseek-api",
            Self::DeepseekApiParsed => "deepseek-api-parsed",
            Self::LocalBackup => "local-backup",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "deepseek-api" => Self::DeepseekApi,
            "deepseek-api-parsed" => Self::DeepseekApiParsed,
            "local-backup" => Self::LocalBackup,
            other => {
                tracing::warn!(source = other, "unknown analysis source, defaulting to local-backup");
                Self::LocalBackup
            }
        }
    }
}

/// The stored result of analysing one input text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Primary key, assigned at creation, immutable thereafter.
    pub id: Uuid,
    /// The full source text that was analysed. Required, non-empty.
    pub input_text: String,
    /// Original filename when the text came from an upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Extracted entity mentions, in extraction order.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// ESG dimension scores. Defaults to all zeros when the producer
    /// omitted them, so evaluation stays total.
    #[serde(default)]
    pub esg_scores: EsgScores,
    /// Free-text insights, in producer order.
    #[serde(default)]
    pub key_insights: Vec<String>,
    /// Identified risks.
    #[serde(default)]
    pub risks: Vec<RiskItem>,
    /// Free-text recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub status: AnalysisStatus,
    pub source: AnalysisSource,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// The company name from extracted entities, if any company-typed
    /// entity is present (checked in priority order: `公司名称`,
    /// `company`, `organization`).
    pub fn company_entity(&self) -> Option<&str> {
        COMPANY_ENTITY_TYPES.iter().find_map(|wanted| {
            self.entities
                .iter()
                .find(|e| e.entity_type == *wanted)
                .map(|e| e.value.as_str())
        })
    }

    /// Resolve the display name for the analysed company.
    ///
    /// Resolution chain: company-typed entity → filename with its report
    /// extension stripped → the generic placeholder `该公司`.
    pub fn company_name(&self) -> String {
        if let Some(name) = self.company_entity() {
            return name.to_string();
        }
        if let Some(file_name) = &self.file_name {
            return strip_report_extension(file_name).to_string();
        }
        "该公司".to_string()
    }
}

/// Strip a trailing report-file extension (`.txt`, `.pdf`, `.doc`,
/// `.docx`), case-insensitively. Other extensions are left alone.
pub fn strip_report_extension(file_name: &str) -> &str {
    const EXTENSIONS: [&str; 4] = [".txt", ".pdf", ".docx", ".doc"];
    let lower = file_name.to_ascii_lowercase();
    for ext in EXTENSIONS {
        if lower.ends_with(ext) {
            return &file_name[..file_name.len() - ext.len()];
        }
    }
    file_name
}
