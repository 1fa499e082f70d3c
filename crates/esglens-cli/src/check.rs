//! Offline deterministic compliance check.
//!
//! Evaluates an analysis record from a JSON file (or stdin) against the
//! rule catalog using only the deterministic evaluator — no network, no
//! database. Useful for inspecting how the fallback path scores a record.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use esglens_core::{AnalysisRecord, AnalysisSource, AnalysisStatus, Entity, EsgScores, RiskItem};
use esglens_rules::{aggregate, evaluate};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to an analysis record JSON file, or `-` for stdin.
    pub record: PathBuf,

    /// Rule ids to evaluate (comma-separated). Defaults to all 12 rules.
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Emit the full report as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Minimal record input: only the text is required; everything else is
/// optional so a hand-written fixture stays short.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordInput {
    input_text: String,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    esg_scores: EsgScores,
    #[serde(default)]
    key_insights: Vec<String>,
    #[serde(default)]
    risks: Vec<RiskItem>,
}

pub fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let raw = if args.record.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.record)
            .with_context(|| format!("reading {}", args.record.display()))?
    };

    let input: RecordInput = serde_json::from_str(&raw).context("parsing analysis record JSON")?;
    let record = AnalysisRecord {
        id: Uuid::new_v4(),
        input_text: input.input_text,
        file_name: input.file_name,
        entities: input.entities,
        esg_scores: input.esg_scores,
        key_insights: input.key_insights,
        risks: input.risks,
        recommendations: vec![],
        status: AnalysisStatus::Completed,
        source: AnalysisSource::LocalBackup,
        created_at: Utc::now(),
    };

    let rule_ids = (!args.rules.is_empty()).then_some(args.rules.as_slice());
    let report = aggregate(evaluate(&record, rule_ids));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "overall: {}% ({} passed, {} warnings, {} failed)",
        report.overall.rate, report.overall.passed, report.overall.warnings, report.overall.failed
    );
    for (label, category) in [
        ("environmental", &report.categories.environmental),
        ("social", &report.categories.social),
        ("governance", &report.categories.governance),
    ] {
        println!("{label}: {}%", category.rate);
        for verdict in &category.rules {
            println!("  {:3} {:7} {}", verdict.id, verdict.status.as_str(), verdict.name);
        }
    }
    Ok(())
}
