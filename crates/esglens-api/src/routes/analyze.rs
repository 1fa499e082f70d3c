//! # ESG Text Analysis Endpoint
//!
//! `POST /api/analyze` — scores user-submitted text via DeepSeek and
//! persists the result. The analysis pipeline itself never fails (see
//! `esglens_deepseek::analysis`); only validation and persistence errors
//! surface to the caller.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use esglens_core::AnalysisRecord;
use esglens_deepseek::analysis;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// The text to analyse. Required, non-empty.
    pub text: Option<String>,
    #[serde(default)]
    pub options: AnalyzeOptions,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Original filename when the text came from a document.
    pub file_name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

/// POST /api/analyze — analyse a text and persist the result.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis result with its persisted id", body = AnalysisRecord),
        (status = 400, description = "Empty input text", body = crate::error::ErrorBody),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorBody),
    ),
    tag = "analysis"
)]
pub(crate) async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let text = request.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(esglens_core::ValidationError::EmptyInputText.into());
    }

    tracing::info!(text_len = text.len(), "starting ESG analysis");
    let outcome = analysis::analyze_text(state.chat.as_ref(), &state.deepseek, &text).await;

    let record = AnalysisRecord {
        id: Uuid::new_v4(),
        input_text: text,
        file_name: request.options.file_name,
        entities: outcome.entities,
        esg_scores: outcome.esg_scores,
        key_insights: outcome.key_insights,
        risks: outcome.risks,
        recommendations: outcome.recommendations,
        status: outcome.status,
        source: outcome.source,
        created_at: Utc::now(),
    };

    db::analyses::insert(&state.pool, &record).await?;
    tracing::info!(id = %record.id, source = record.source.as_str(), "analysis stored");

    Ok(Json(record))
}
