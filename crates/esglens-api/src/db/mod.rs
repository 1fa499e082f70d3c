//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx for analysis records, compliance rules,
//! compliance results, and users. Embedded migrations run at startup.
//!
//! Referential integrity: `compliance_results.analysis_id` references
//! `analysis_results.id`, so deleting an analysis removes its compliance
//! results first (children before parent — a correctness requirement, not
//! an optimisation).

pub mod analyses;
pub mod compliance;
pub mod rules;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
