//! # esglens-api — Axum API Services
//!
//! REST API for the esglens ESG analysis platform.
//!
//! ## API Surface
//!
//! | Method & Path                         | Module                 | Purpose                          |
//! |---------------------------------------|------------------------|----------------------------------|
//! | `POST /api/analyze`                   | [`routes::analyze`]    | Score a text via DeepSeek        |
//! | `GET /api/history`                    | [`routes::analyses`]   | Paginated analysis history       |
//! | `GET/DELETE /api/analysis/{id}`       | [`routes::analyses`]   | Fetch / delete one analysis      |
//! | `POST /api/compliance/check`          | [`routes::compliance`] | Two-tier compliance check        |
//! | `GET /api/compliance/rules`           | [`routes::compliance`] | Rule configuration               |
//! | `PUT /api/compliance/rules/{id}`      | [`routes::compliance`] | Partial rule update              |
//! | `GET /api/compliance/result/{id}`     | [`routes::compliance`] | Latest stored report             |
//! | `GET /api/stats`                      | [`routes::stats`]      | Dashboard statistics             |
//! | `GET /api/risks`, `/api/risk-alerts`  | [`routes::stats`]      | Flattened risk alerts            |
//! | `POST /api/auth/register`, `/login`   | [`routes::auth`]       | Accounts and tokens              |
//! | `GET /openapi.json`                   | [`openapi`]            | Generated OpenAPI spec           |
//!
//! Health probes (`/api/health`, `/health/liveness`, `/health/readiness`)
//! sit outside the API tag groups; readiness checks the database.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Body limit is 50 MiB — analysis requests carry whole report texts.
/// CORS is permissive: the dashboard is served from a separate origin.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::analyze::router())
        .merge(routes::analyses::router())
        .merge(routes::compliance::router())
        .merge(routes::stats::router())
        .merge(routes::auth::router())
        .merge(openapi::router());

    Router::new()
        .route("/api/health", get(health))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(api)
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<Utc>,
}

/// GET /api/health — basic health check with a timestamp.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the database connection is healthy.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = sqlx::query("SELECT 1").execute(&state.pool).await {
        tracing::warn!("Database health check failed: {e}");
        return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
