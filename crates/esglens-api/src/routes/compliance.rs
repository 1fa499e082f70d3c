//! # Compliance Endpoints
//!
//! The compliance-check endpoint and rule management. A check always
//! returns 200 with *some* report once the analysis record is found —
//! LLM failures are absorbed by the deterministic fallback, never
//! surfaced to the caller (availability over accuracy).
//!
//! Concurrent checks against the same analysis are not serialised or
//! deduplicated: both evaluate, both append a result row; "latest" is a
//! read-time convention.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use esglens_deepseek::compliance::evaluate_via_llm;
use esglens_rules::report::ComplianceReport;
use esglens_rules::Rule;

use crate::db::{self, compliance::StoredComplianceResult, rules::RuleUpdate};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheckRequest {
    /// Id of the analysis record to check.
    pub analysis_id: Option<Uuid>,
    /// Client-side rule configuration; only entries with `enabled: true`
    /// are evaluated. Absent means all 12 catalog rules.
    pub rules: Option<Vec<Rule>>,
}

/// Partial rule update; absent fields keep their stored values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RuleUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub threshold: Option<f64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/compliance/check", post(check_compliance))
        .route("/api/compliance/rules", get(list_rules))
        .route("/api/compliance/rules/:id", put(update_rule))
        .route("/api/compliance/result/:analysis_id", get(latest_result))
}

/// POST /api/compliance/check — run a compliance check for an analysis.
#[utoipa::path(
    post,
    path = "/api/compliance/check",
    request_body = ComplianceCheckRequest,
    responses(
        (status = 200, description = "Aggregated compliance report", body = ComplianceReport),
        (status = 400, description = "Missing analysis id", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown analysis id", body = crate::error::ErrorBody),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub(crate) async fn check_compliance(
    State(state): State<AppState>,
    Json(request): Json<ComplianceCheckRequest>,
) -> Result<Json<ComplianceReport>, AppError> {
    let Some(analysis_id) = request.analysis_id else {
        return Err(AppError::Validation("分析ID不能为空".to_string()));
    };

    let Some(record) = db::analyses::get_by_id(&state.pool, analysis_id).await? else {
        return Err(AppError::NotFound("分析结果不存在".to_string()));
    };

    tracing::info!(
        analysis_id = %analysis_id,
        custom_rules = request.rules.as_ref().map(Vec::len),
        "starting compliance check"
    );

    let report = evaluate_via_llm(state.chat.as_ref(), &record, request.rules.as_deref()).await;

    db::compliance::save_result(&state.pool, analysis_id, &report).await?;
    tracing::info!(
        analysis_id = %analysis_id,
        rate = report.overall.rate,
        total = report.total_rules(),
        "compliance check stored"
    );

    Ok(Json(report))
}

/// GET /api/compliance/rules — list the rule configuration.
#[utoipa::path(
    get,
    path = "/api/compliance/rules",
    responses(
        (status = 200, description = "All compliance rules", body = [Rule]),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub(crate) async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<Rule>>, AppError> {
    Ok(Json(db::rules::list(&state.pool).await?))
}

/// PUT /api/compliance/rules/{id} — partially update one rule.
#[utoipa::path(
    put,
    path = "/api/compliance/rules/{id}",
    params(("id" = String, Path, description = "Rule id, e.g. e1")),
    request_body = RuleUpdateRequest,
    responses(
        (status = 200, description = "The updated rule", body = Rule),
        (status = 404, description = "Unknown rule id", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub(crate) async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RuleUpdateRequest>,
) -> Result<Json<Rule>, AppError> {
    let updates = RuleUpdate {
        name: request.name,
        description: request.description,
        enabled: request.enabled,
        threshold: request.threshold,
    };
    match db::rules::update(&state.pool, &id, updates).await? {
        Some(rule) => Ok(Json(rule)),
        None => Err(AppError::NotFound("规则不存在".to_string())),
    }
}

/// GET /api/compliance/result/{analysis_id} — latest stored report.
#[utoipa::path(
    get,
    path = "/api/compliance/result/{analysis_id}",
    params(("analysis_id" = Uuid, Path, description = "Analysis record id")),
    responses(
        (status = 200, description = "Most recent compliance result", body = StoredComplianceResult),
        (status = 404, description = "No stored result for this analysis", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub(crate) async fn latest_result(
    State(state): State<AppState>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Json<StoredComplianceResult>, AppError> {
    match db::compliance::latest_by_analysis(&state.pool, analysis_id).await? {
        Some(result) => Ok(Json(result)),
        None => Err(AppError::NotFound("合规检测结果不存在".to_string())),
    }
}
