//! # Dashboard Statistics & Risk Alerts
//!
//! Aggregate counts over the analysis table and a flattened view of
//! recent risks for the dashboard's alert panel.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use esglens_core::{AnalysisRecord, RiskLevel};

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Analyses created today.
    pub today_analysis: i64,
    /// Average overall ESG score, one decimal; null when no scored rows.
    pub avg_esg_score: Option<f64>,
    /// Average score scaled to a 0–100 rate; null when no scored rows.
    pub compliance_rate: Option<i64>,
    /// Analyses carrying at least one risk.
    pub risk_alerts: i64,
    pub total_analysis: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    /// Synthetic id: `{analysis_id}_{index}`.
    pub id: String,
    pub title: String,
    pub company: String,
    /// Derived severity: `high`, `medium`, or `low`.
    pub severity: String,
    pub description: String,
    pub analysis_date: String,
    pub esg_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct RiskAlertParams {
    pub limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/risks", get(risks))
        .route("/api/risk-alerts", get(risk_alerts))
}

/// GET /api/stats — dashboard statistics.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorBody),
    ),
    tag = "stats"
)]
pub(crate) async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = db::analyses::stats(&state.pool).await?;
    Ok(Json(StatsResponse {
        today_analysis: stats.today_count,
        avg_esg_score: stats.avg_overall.map(|avg| (avg * 10.0).round() / 10.0),
        compliance_rate: stats.avg_overall.map(|avg| (avg * 10.0).round() as i64),
        risk_alerts: stats.with_risks,
        total_analysis: stats.total_count,
    }))
}

/// GET /api/risks — risk alerts with the default limit.
#[utoipa::path(
    get,
    path = "/api/risks",
    responses(
        (status = 200, description = "Recent risk alerts", body = [RiskAlert]),
    ),
    tag = "stats"
)]
pub(crate) async fn risks(State(state): State<AppState>) -> Result<Json<Vec<RiskAlert>>, AppError> {
    fetch_alerts(&state, 10).await
}

/// GET /api/risk-alerts — risk alerts with an explicit limit.
#[utoipa::path(
    get,
    path = "/api/risk-alerts",
    params(("limit" = Option<i64>, Query, description = "Maximum number of alerts")),
    responses(
        (status = 200, description = "Recent risk alerts", body = [RiskAlert]),
    ),
    tag = "stats"
)]
pub(crate) async fn risk_alerts(
    State(state): State<AppState>,
    Query(params): Query<RiskAlertParams>,
) -> Result<Json<Vec<RiskAlert>>, AppError> {
    fetch_alerts(&state, params.limit.unwrap_or(10)).await
}

async fn fetch_alerts(state: &AppState, limit: i64) -> Result<Json<Vec<RiskAlert>>, AppError> {
    let limit = limit.clamp(1, 100);
    let records = db::analyses::recent_with_risks(&state.pool, limit).await?;
    Ok(Json(build_alerts(records, limit as usize)))
}

/// Flatten per-analysis risks into alert items.
///
/// Severity blends the analysis-level overall score with the risk's own
/// level: a weak overall score escalates every risk on that record.
fn build_alerts(records: Vec<AnalysisRecord>, limit: usize) -> Vec<RiskAlert> {
    let mut alerts = Vec::new();
    for record in records {
        let company = record.company_entity().unwrap_or("未知公司").to_string();
        let overall = record.esg_scores.overall;
        let date = record.created_at.format("%Y/%-m/%-d").to_string();

        for risk in &record.risks {
            let severity = if overall < 5.0 || risk.level == RiskLevel::High {
                "high"
            } else if overall < 7.0 || risk.level == RiskLevel::Medium {
                "medium"
            } else {
                "low"
            };

            alerts.push(RiskAlert {
                id: format!("{}_{}", record.id, alerts.len()),
                title: alert_title(&risk.description),
                company: company.clone(),
                severity: severity.to_string(),
                description: if risk.description.is_empty() {
                    "需要关注的ESG风险项".to_string()
                } else {
                    risk.description.clone()
                },
                analysis_date: date.clone(),
                esg_score: overall,
            });
        }
    }
    alerts.truncate(limit);
    alerts
}

fn alert_title(description: &str) -> String {
    if description.is_empty() {
        return "风险预警".to_string();
    }
    let prefix: String = description.chars().take(20).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use esglens_core::{AnalysisSource, AnalysisStatus, Entity, EsgScores, RiskItem};
    use uuid::Uuid;

    fn record(overall: f64, risks: Vec<RiskItem>) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            input_text: "文本".to_string(),
            file_name: None,
            entities: vec![Entity::new("公司名称", "星河实业", 0.9)],
            esg_scores: EsgScores::new(0.0, 0.0, 0.0, overall),
            key_insights: vec![],
            risks,
            recommendations: vec![],
            status: AnalysisStatus::Completed,
            source: AnalysisSource::DeepseekApi,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn low_overall_score_escalates_severity() {
        let alerts = build_alerts(
            vec![record(4.0, vec![RiskItem::new(RiskLevel::Low, "供应链集中度偏高")])],
            10,
        );
        assert_eq!(alerts[0].severity, "high");
        assert_eq!(alerts[0].company, "星河实业");
    }

    #[test]
    fn healthy_score_keeps_low_severity() {
        let alerts = build_alerts(
            vec![record(8.0, vec![RiskItem::new(RiskLevel::Low, "整体ESG风险较低")])],
            10,
        );
        assert_eq!(alerts[0].severity, "low");
    }

    #[test]
    fn medium_band_and_level_both_map_to_medium() {
        let alerts = build_alerts(
            vec![record(6.0, vec![RiskItem::new(RiskLevel::Low, "治理风险需要关注")])],
            10,
        );
        assert_eq!(alerts[0].severity, "medium");

        let alerts = build_alerts(
            vec![record(9.0, vec![RiskItem::new(RiskLevel::Medium, "环境风险需要关注")])],
            10,
        );
        assert_eq!(alerts[0].severity, "medium");
    }

    #[test]
    fn alerts_flatten_and_respect_limit() {
        let risks = vec![
            RiskItem::new(RiskLevel::Medium, "风险一"),
            RiskItem::new(RiskLevel::Medium, "风险二"),
            RiskItem::new(RiskLevel::Medium, "风险三"),
        ];
        let alerts = build_alerts(vec![record(6.0, risks)], 2);
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].id.ends_with("_0"));
        assert!(alerts[1].id.ends_with("_1"));
    }

    #[test]
    fn title_truncates_long_descriptions() {
        let long = "这是一条非常长的风险描述内容用于验证标题截断行为是否正确无误";
        let alerts = build_alerts(vec![record(6.0, vec![RiskItem::new(RiskLevel::Low, long)])], 10);
        assert!(alerts[0].title.ends_with("..."));
        assert!(alerts[0].title.chars().count() <= 23);
        assert_eq!(alerts[0].description, long);
    }
}
