//! # Database Contract Tests
//!
//! Exercises the persistence layer against a live Postgres instance.
//! Ignored by default; run with a scratch database:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/esglens_test cargo test -- --ignored
//! ```

use chrono::Utc;
use uuid::Uuid;

use esglens_api::db;
use esglens_core::{AnalysisRecord, AnalysisSource, AnalysisStatus, Entity, EsgScores, RiskItem, RiskLevel};
use esglens_rules::{aggregate, evaluate};

async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
    db::init_pool(&url).await.expect("pool init and migrations")
}

fn sample_record() -> AnalysisRecord {
    AnalysisRecord {
        id: Uuid::new_v4(),
        input_text: "公司披露了碳排放数据，建立了反腐败制度和风险管理体系".to_string(),
        file_name: Some("esg-2024.txt".to_string()),
        entities: vec![Entity::new("公司名称", "AcmeCorp", 0.9)],
        esg_scores: EsgScores::new(8.0, 6.5, 7.2, 7.2),
        key_insights: vec!["披露较为完整".to_string()],
        risks: vec![RiskItem::new(RiskLevel::Medium, "治理风险需要关注")],
        recommendations: vec![],
        status: AnalysisStatus::Completed,
        source: AnalysisSource::DeepseekApi,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn analysis_round_trip() {
    let pool = test_pool().await;
    let record = sample_record();

    db::analyses::insert(&pool, &record).await.unwrap();
    let fetched = db::analyses::get_by_id(&pool, record.id)
        .await
        .unwrap()
        .expect("record exists");

    assert_eq!(fetched.input_text, record.input_text);
    assert_eq!(fetched.esg_scores, record.esg_scores);
    assert_eq!(fetched.entities, record.entities);
    assert_eq!(fetched.risks, record.risks);
    assert_eq!(fetched.source, AnalysisSource::DeepseekApi);

    assert!(db::analyses::delete(&pool, record.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn delete_cascades_to_compliance_results() {
    let pool = test_pool().await;
    let record = sample_record();
    db::analyses::insert(&pool, &record).await.unwrap();

    let report = aggregate(evaluate(&record, None));
    db::compliance::save_result(&pool, record.id, &report).await.unwrap();
    assert!(db::compliance::latest_by_analysis(&pool, record.id)
        .await
        .unwrap()
        .is_some());

    // Delete must remove children first, then the record.
    assert!(db::analyses::delete(&pool, record.id).await.unwrap());

    // No orphaned compliance result remains.
    assert!(db::compliance::latest_by_analysis(&pool, record.id)
        .await
        .unwrap()
        .is_none());
    assert!(db::analyses::get_by_id(&pool, record.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn compliance_result_requires_existing_analysis() {
    let pool = test_pool().await;
    let report = aggregate(evaluate(&sample_record(), None));

    // Foreign key rejects a result for a nonexistent analysis.
    let result = db::compliance::save_result(&pool, Uuid::new_v4(), &report).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn latest_result_wins_by_creation_time() {
    let pool = test_pool().await;
    let record = sample_record();
    db::analyses::insert(&pool, &record).await.unwrap();

    let first = aggregate(evaluate(&record, Some(&["e1".to_string()])));
    db::compliance::save_result(&pool, record.id, &first).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = aggregate(evaluate(&record, None));
    db::compliance::save_result(&pool, record.id, &second).await.unwrap();

    let latest = db::compliance::latest_by_analysis(&pool, record.id)
        .await
        .unwrap()
        .expect("stored result");
    assert_eq!(latest.overall.passed + latest.overall.warnings + latest.overall.failed, 12);

    db::analyses::delete(&pool, record.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn rule_update_is_partial() {
    let pool = test_pool().await;

    let rules = db::rules::list(&pool).await.unwrap();
    assert_eq!(rules.len(), 12);
    let original = rules.iter().find(|r| r.id == "e1").unwrap().clone();

    // Toggle enabled only; everything else must keep its stored value.
    let updated = db::rules::update(
        &pool,
        "e1",
        db::rules::RuleUpdate {
            enabled: Some(!original.enabled),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("rule exists");

    assert_eq!(updated.enabled, !original.enabled);
    assert_eq!(updated.name, original.name);
    assert_eq!(updated.threshold, original.threshold);

    // Restore.
    db::rules::update(
        &pool,
        "e1",
        db::rules::RuleUpdate {
            enabled: Some(original.enabled),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Unknown rule id updates nothing.
    let missing = db::rules::update(&pool, "zzz", db::rules::RuleUpdate::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn history_search_and_pagination() {
    let pool = test_pool().await;
    let mut record = sample_record();
    record.file_name = Some("searchable-marker-报告.txt".to_string());
    db::analyses::insert(&pool, &record).await.unwrap();

    let page = db::analyses::list(&pool, 1, 10, "searchable-marker", "all")
        .await
        .unwrap();
    assert!(page.total >= 1);
    assert!(page.results.iter().any(|r| r.id == record.id));

    let none = db::analyses::list(&pool, 1, 10, "searchable-marker", "failed")
        .await
        .unwrap();
    assert!(none.results.iter().all(|r| r.id != record.id));

    db::analyses::delete(&pool, record.id).await.unwrap();
}
