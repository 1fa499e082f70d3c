//! Compliance rule configuration persistence.
//!
//! The 12 catalog rules are seeded by migration; this module serves the
//! rule-management API: listing and coalesce-style partial updates.

use sqlx::PgPool;

use esglens_rules::{Rule, RuleCategory};

/// Fields of a partial rule update. Absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub threshold: Option<f64>,
}

/// List all rules ordered by category and id.
pub async fn list(pool: &PgPool) -> Result<Vec<Rule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RuleRow>(
        "SELECT id, category, name, description, enabled, threshold \
         FROM compliance_rules ORDER BY category, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(RuleRow::into_rule).collect())
}

/// Apply a partial update to one rule, returning the updated rule or
/// `None` when the id is unknown. Only present fields change.
pub async fn update(
    pool: &PgPool,
    id: &str,
    updates: RuleUpdate,
) -> Result<Option<Rule>, sqlx::Error> {
    let row = sqlx::query_as::<_, RuleRow>(
        "UPDATE compliance_rules \
         SET name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             enabled = COALESCE($4, enabled), \
             threshold = COALESCE($5, threshold), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING id, category, name, description, enabled, threshold",
    )
    .bind(id)
    .bind(updates.name)
    .bind(updates.description)
    .bind(updates.enabled)
    .bind(updates.threshold)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(RuleRow::into_rule))
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: String,
    category: String,
    name: String,
    description: Option<String>,
    enabled: bool,
    threshold: f64,
}

impl RuleRow {
    fn into_rule(self) -> Option<Rule> {
        let Some(category) = RuleCategory::parse(&self.category) else {
            // Category partitions aggregation; a row with an unknown one
            // is unusable.
            tracing::error!(id = %self.id, category = %self.category, "skipping rule row with unknown category");
            return None;
        };
        Some(Rule {
            id: self.id,
            category,
            name: self.name,
            description: self.description.unwrap_or_default(),
            enabled: self.enabled,
            threshold: self.threshold,
        })
    }
}
