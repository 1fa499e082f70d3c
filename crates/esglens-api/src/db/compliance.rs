//! Compliance result persistence.
//!
//! Reports append — multiple results may exist per analysis; "latest" is
//! a read-time convention ordered by creation time. The foreign key on
//! `analysis_id` rejects results for nonexistent analyses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use esglens_rules::report::{ComplianceReport, OverallSummary};

/// A stored compliance result as returned by the results API: summary
/// columns plus the category detail JSON exactly as persisted.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredComplianceResult {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub overall: OverallSummary,
    #[schema(value_type = Object)]
    pub categories: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Persist a compliance report for an analysis.
pub async fn save_result(
    pool: &PgPool,
    analysis_id: Uuid,
    report: &ComplianceReport,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO compliance_results \
         (id, analysis_id, overall_rate, passed_count, warnings_count, failed_count, \
          detailed_results, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(analysis_id)
    .bind(report.overall.rate)
    .bind(report.overall.passed as i32)
    .bind(report.overall.warnings as i32)
    .bind(report.overall.failed as i32)
    .bind(Json(&report.categories))
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

/// The most recent compliance result for an analysis, if any.
pub async fn latest_by_analysis(
    pool: &PgPool,
    analysis_id: Uuid,
) -> Result<Option<StoredComplianceResult>, sqlx::Error> {
    let row = sqlx::query_as::<_, ComplianceRow>(
        "SELECT id, analysis_id, overall_rate, passed_count, warnings_count, failed_count, \
                detailed_results, created_at \
         FROM compliance_results WHERE analysis_id = $1 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(analysis_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ComplianceRow::into_result))
}

#[derive(sqlx::FromRow)]
struct ComplianceRow {
    id: Uuid,
    analysis_id: Uuid,
    overall_rate: i32,
    passed_count: i32,
    warnings_count: i32,
    failed_count: i32,
    detailed_results: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ComplianceRow {
    fn into_result(self) -> StoredComplianceResult {
        StoredComplianceResult {
            id: self.id,
            analysis_id: self.analysis_id,
            overall: OverallSummary {
                rate: self.overall_rate,
                passed: self.passed_count.max(0) as usize,
                warnings: self.warnings_count.max(0) as usize,
                failed: self.failed_count.max(0) as usize,
            },
            categories: self.detailed_results,
            created_at: self.created_at,
        }
    }
}
