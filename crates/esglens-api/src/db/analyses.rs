//! Analysis record persistence.
//!
//! All functions take a `&PgPool` and operate on the `analysis_results`
//! table. JSONB columns are decoded leniently: a row with corrupt JSON
//! degrades to empty collections rather than failing the query, so one
//! bad row cannot break a listing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::ToSchema;
use uuid::Uuid;

use esglens_core::{AnalysisRecord, AnalysisSource, AnalysisStatus, EsgScores};

const SELECT_COLUMNS: &str = "id, input_text, file_name, entities, esg_scores, key_insights, \
     risks, recommendations, status, source, created_at";

/// Insert a new analysis record.
pub async fn insert(pool: &PgPool, record: &AnalysisRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO analysis_results \
         (id, input_text, file_name, entities, esg_scores, key_insights, risks, \
          recommendations, status, source, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)",
    )
    .bind(record.id)
    .bind(&record.input_text)
    .bind(&record.file_name)
    .bind(Json(&record.entities))
    .bind(Json(&record.esg_scores))
    .bind(&record.key_insights)
    .bind(Json(&record.risks))
    .bind(&record.recommendations)
    .bind(record.status.as_str())
    .bind(record.source.as_str())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch an analysis record by id.
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AnalysisRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, AnalysisRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM analysis_results WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AnalysisRow::into_record))
}

/// One page of analysis history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub results: Vec<AnalysisRecord>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// List analysis records with pagination, text search, and status filter.
///
/// `search` matches input text or filename (ILIKE); `status` of `"all"`
/// disables the status filter.
pub async fn list(
    pool: &PgPool,
    page: i64,
    limit: i64,
    search: &str,
    status: &str,
) -> Result<HistoryPage, sqlx::Error> {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut count_query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM analysis_results WHERE 1=1");
    push_filters(&mut count_query, search, status);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut data_query: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM analysis_results WHERE 1=1"));
    push_filters(&mut data_query, search, status);
    data_query.push(" ORDER BY created_at DESC LIMIT ");
    data_query.push_bind(limit);
    data_query.push(" OFFSET ");
    data_query.push_bind(offset);

    let rows: Vec<AnalysisRow> = data_query.build_query_as().fetch_all(pool).await?;
    let results = rows.into_iter().map(AnalysisRow::into_record).collect();

    Ok(HistoryPage {
        results,
        total,
        page,
        limit,
        total_pages: (total + limit - 1) / limit,
    })
}

fn push_filters(query: &mut QueryBuilder<Postgres>, search: &str, status: &str) {
    if !search.is_empty() {
        let pattern = format!("%{search}%");
        query.push(" AND (input_text ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR file_name ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if status != "all" {
        query.push(" AND status = ");
        query.push_bind(status.to_string());
    }
}

/// Delete an analysis record and its compliance results.
///
/// Children are deleted before the parent inside one transaction to
/// satisfy the foreign key. Returns false when the id does not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM compliance_results WHERE analysis_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM analysis_results WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Dashboard statistics over the analysis table.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisStats {
    pub today_count: i64,
    pub total_count: i64,
    /// Average of the stored `overall` score across scored rows.
    pub avg_overall: Option<f64>,
    /// Number of analyses carrying at least one risk.
    pub with_risks: i64,
}

pub async fn stats(pool: &PgPool) -> Result<AnalysisStats, sqlx::Error> {
    let today_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results WHERE created_at::date = CURRENT_DATE")
            .fetch_one(pool)
            .await?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results")
        .fetch_one(pool)
        .await?;

    let avg_overall: Option<f64> = sqlx::query_scalar(
        "SELECT AVG((esg_scores->>'overall')::double precision) FROM analysis_results \
         WHERE esg_scores->>'overall' IS NOT NULL \
           AND (esg_scores->>'overall')::double precision > 0",
    )
    .fetch_one(pool)
    .await?;

    let with_risks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analysis_results \
         WHERE jsonb_array_length(COALESCE(risks, '[]'::jsonb)) > 0",
    )
    .fetch_one(pool)
    .await?;

    Ok(AnalysisStats {
        today_count,
        total_count,
        avg_overall,
        with_risks,
    })
}

/// Most recent analyses that carry at least one risk, newest first.
pub async fn recent_with_risks(pool: &PgPool, limit: i64) -> Result<Vec<AnalysisRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AnalysisRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM analysis_results \
         WHERE jsonb_array_length(COALESCE(risks, '[]'::jsonb)) > 0 \
         ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnalysisRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    input_text: String,
    file_name: Option<String>,
    entities: Option<serde_json::Value>,
    esg_scores: serde_json::Value,
    key_insights: Vec<String>,
    risks: Option<serde_json::Value>,
    recommendations: Vec<String>,
    status: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl AnalysisRow {
    fn into_record(self) -> AnalysisRecord {
        let entities = self
            .entities
            .map(|value| decode_json(value, self.id, "entities"))
            .unwrap_or_default();
        let risks = self
            .risks
            .map(|value| decode_json(value, self.id, "risks"))
            .unwrap_or_default();
        let esg_scores: EsgScores = decode_json(self.esg_scores, self.id, "esg_scores");

        AnalysisRecord {
            id: self.id,
            input_text: self.input_text,
            file_name: self.file_name,
            entities,
            esg_scores,
            key_insights: self.key_insights,
            risks,
            recommendations: self.recommendations,
            status: AnalysisStatus::parse_lenient(&self.status),
            source: AnalysisSource::parse_lenient(&self.source),
            created_at: self.created_at,
        }
    }
}

/// Decode a JSONB column, degrading to the type's default on corrupt data.
fn decode_json<T: serde::de::DeserializeOwned + Default>(
    value: serde_json::Value,
    id: Uuid,
    column: &str,
) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(id = %id, column, error = %e, "corrupt JSON column, using default");
        T::default()
    })
}
