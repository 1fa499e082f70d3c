//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "esglens API",
        description = "ESG analysis platform: DeepSeek-backed text scoring, \
            two-tier compliance checks (LLM with deterministic fallback), \
            rule management, history, and dashboard statistics.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server"),
    ),
    paths(
        crate::routes::analyze::analyze,
        crate::routes::analyses::history,
        crate::routes::analyses::get_analysis,
        crate::routes::analyses::delete_analysis,
        crate::routes::compliance::check_compliance,
        crate::routes::compliance::list_rules,
        crate::routes::compliance::update_rule,
        crate::routes::compliance::latest_result,
        crate::routes::stats::stats,
        crate::routes::stats::risks,
        crate::routes::stats::risk_alerts,
        crate::routes::auth::register,
        crate::routes::auth::login,
    ),
    components(schemas(
        esglens_core::AnalysisRecord,
        esglens_core::Entity,
        esglens_core::EsgScores,
        esglens_core::RiskItem,
        esglens_core::RiskLevel,
        esglens_core::AnalysisStatus,
        esglens_core::AnalysisSource,
        esglens_rules::Rule,
        esglens_rules::RuleCategory,
        esglens_rules::report::RuleStatus,
        esglens_rules::report::RuleVerdict,
        esglens_rules::report::CategoryReport,
        esglens_rules::report::CategoryReports,
        esglens_rules::report::OverallSummary,
        esglens_rules::report::ComplianceReport,
        crate::error::ErrorBody,
        crate::db::analyses::HistoryPage,
        crate::db::compliance::StoredComplianceResult,
        crate::routes::analyze::AnalyzeRequest,
        crate::routes::analyze::AnalyzeOptions,
        crate::routes::analyses::MessageResponse,
        crate::routes::compliance::ComplianceCheckRequest,
        crate::routes::compliance::RuleUpdateRequest,
        crate::routes::stats::StatsResponse,
        crate::routes::stats::RiskAlert,
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::UserResponse,
        crate::routes::auth::RegisterResponse,
        crate::routes::auth::LoginResponse,
    )),
    tags(
        (name = "analysis", description = "ESG text analysis and history"),
        (name = "compliance", description = "Compliance checks and rule management"),
        (name = "stats", description = "Dashboard statistics and risk alerts"),
        (name = "auth", description = "Registration and login"),
    )
)]
pub struct ApiDoc;

/// Router serving the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
