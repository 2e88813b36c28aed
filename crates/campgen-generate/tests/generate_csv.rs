use std::fs;
use std::path::PathBuf;

use campgen_core::TABLE_ORDER;
use campgen_generate::{GenerateOptions, GenerationEngine};
use campgen_plan::WorkloadPlan;

fn temp_out_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("campgen_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn small_plan(seed: u64) -> WorkloadPlan {
    WorkloadPlan {
        seed,
        base_campaigns: 40,
        ..WorkloadPlan::default()
    }
}

#[test]
fn generate_is_deterministic() {
    let plan = small_plan(7);

    let mut options = GenerateOptions::default();
    options.out_dir = temp_out_dir("run_a");
    let result_a = GenerationEngine::new(options).run(&plan).expect("run A");

    let mut options = GenerateOptions::default();
    options.out_dir = temp_out_dir("run_b");
    let result_b = GenerationEngine::new(options).run(&plan).expect("run B");

    for table in TABLE_ORDER {
        let file = format!("{table}.csv");
        let a = fs::read(result_a.run_dir.join(&file)).expect("read A");
        let b = fs::read(result_b.run_dir.join(&file)).expect("read B");
        assert_eq!(a, b, "{file} should be deterministic");
    }
    assert_eq!(result_a.report.random_draws, result_b.report.random_draws);
}

#[test]
fn different_seeds_produce_different_campaigns() {
    let engine = GenerationEngine::default();

    let a = engine.generate(&small_plan(1)).expect("seed 1");
    let b = engine.generate(&small_plan(2)).expect("seed 2");

    assert_eq!(a.dataset.wt_attributes, b.dataset.wt_attributes);
    assert_ne!(a.dataset.campaigns, b.dataset.campaigns);
}

#[test]
fn run_writes_artifacts_and_row_counts() {
    let out_dir = temp_out_dir("run_rows");
    let mut options = GenerateOptions::default();
    options.out_dir = out_dir.clone();

    let result = GenerationEngine::new(options)
        .run(&small_plan(0))
        .expect("run generation");
    assert!(result.run_dir.starts_with(&out_dir));
    assert!(result.run_dir.join("resolved_plan.json").exists());

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(result.run_dir.join("generation_report.json"))
            .expect("read generation_report.json"),
    )
    .expect("parse report");

    let tables = report
        .get("tables")
        .and_then(|value| value.as_array())
        .expect("tables array");
    assert_eq!(tables.len(), 7);

    for (table, expected) in result.dataset.table_counts() {
        let entry = tables
            .iter()
            .find(|entry| entry.get("table").and_then(|v| v.as_str()) == Some(table))
            .unwrap_or_else(|| panic!("missing table {table}"));
        assert_eq!(
            entry.get("rows").and_then(|v| v.as_u64()),
            Some(expected as u64)
        );

        let csv = fs::read_to_string(result.run_dir.join(format!("{table}.csv"))).expect("csv");
        assert_eq!(csv.lines().count(), expected + 1, "{table} rows + header");
    }
    assert_eq!(report.get("campaigns_generated").and_then(|v| v.as_u64()), Some(40));
}

#[test]
fn flat_run_dir_writes_into_out_dir() {
    let out_dir = temp_out_dir("flat");
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir.clone(),
        nest_run_dir: false,
        run_id: Some("flat".to_string()),
    });

    let result = engine.run(&small_plan(3)).expect("run");
    assert_eq!(result.run_dir, out_dir);

    let header = fs::read_to_string(out_dir.join("campaign.csv")).expect("campaign.csv");
    assert_eq!(
        header.lines().next(),
        Some("id,valid_from,valid_to,firing_interval,firing_start_condition")
    );
}
