//! # Analysis History Endpoints
//!
//! History listing with pagination and search, single-record retrieval,
//! and deletion (which cascades to compliance results).

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use esglens_core::AnalysisRecord;

use crate::db::{self, analyses::HistoryPage};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(history))
        .route("/api/analysis/:id", get(get_analysis).delete(delete_analysis))
}

/// GET /api/history — paginated analysis history.
#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("search" = Option<String>, Query, description = "Substring match on input text or filename"),
        ("status" = Option<String>, Query, description = "Status filter, or \"all\""),
    ),
    responses(
        (status = 200, description = "One page of analysis history", body = HistoryPage),
    ),
    tag = "analysis"
)]
pub(crate) async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryPage>, AppError> {
    let page = db::analyses::list(
        &state.pool,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(10),
        params.search.as_deref().unwrap_or(""),
        params.status.as_deref().unwrap_or("all"),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/analysis/{id} — fetch one analysis record.
#[utoipa::path(
    get,
    path = "/api/analysis/{id}",
    params(("id" = Uuid, Path, description = "Analysis record id")),
    responses(
        (status = 200, description = "The analysis record", body = AnalysisRecord),
        (status = 404, description = "Unknown analysis id", body = crate::error::ErrorBody),
    ),
    tag = "analysis"
)]
pub(crate) async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, AppError> {
    match db::analyses::get_by_id(&state.pool, id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound("分析结果不存在".to_string())),
    }
}

/// DELETE /api/analysis/{id} — delete a record and its compliance results.
#[utoipa::path(
    delete,
    path = "/api/analysis/{id}",
    params(("id" = Uuid, Path, description = "Analysis record id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Unknown analysis id", body = crate::error::ErrorBody),
    ),
    tag = "analysis"
)]
pub(crate) async fn delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if db::analyses::delete(&state.pool, id).await? {
        Ok(Json(MessageResponse {
            message: "删除成功".to_string(),
        }))
    } else {
        Err(AppError::NotFound("分析结果不存在".to_string()))
    }
}
