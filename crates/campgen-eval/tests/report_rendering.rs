use std::fs;
use std::path::PathBuf;

use campgen_core::{
    AggregationFn, Campaign, Conjunct, ConjunctPredicate, Constant, DataType, Dataset,
    FiringInterval, FiringStartCondition, Metric, Operator, Predicate, WindowSize, WindowType,
    WtAttribute,
};
use campgen_eval::{
    ReportFormat, collect_dataset_metrics, load_dataset_csv, render_report, write_report,
};
use campgen_generate::{GenerateOptions, GenerationEngine};
use campgen_plan::WorkloadPlan;

const EPOCH: i64 = 1_325_376_000_000;
const DAY: i64 = 86_400_000;

fn temp_out_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("campgen_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn dataset_fixture() -> Dataset {
    Dataset {
        metrics: vec![Metric {
            id: 1,
            name: "cost this week (all)".to_string(),
            data_type: DataType::Double,
        }],
        wt_attributes: vec![WtAttribute {
            id: 1,
            metric_id: 1,
            is_pivot: true,
            window_type: WindowType::Tumbling,
            window_size: WindowSize::Day,
            aggregation_fn: AggregationFn::Sum,
            aggregation_data_type: DataType::Double,
        }],
        constants: vec![
            Constant {
                id: 1,
                value: "42.0".to_string(),
                data_type: DataType::Double,
            },
            Constant {
                id: 2,
                value: "17.0".to_string(),
                data_type: DataType::Double,
            },
        ],
        predicates: vec![
            Predicate {
                id: 1,
                wt_attribute_id: 1,
                operator: Operator::Gre,
                constant_id: 1,
            },
            Predicate {
                id: 2,
                wt_attribute_id: 1,
                operator: Operator::Lt,
                constant_id: 2,
            },
        ],
        campaigns: vec![Campaign {
            id: 1,
            valid_from: EPOCH + 2 * DAY,
            valid_to: EPOCH + 9 * DAY,
            firing_interval: FiringInterval::Daily,
            firing_start_condition: FiringStartCondition::Fixed,
        }],
        conjuncts: vec![
            Conjunct {
                id: 1,
                campaign_id: 1,
            },
            Conjunct {
                id: 2,
                campaign_id: 1,
            },
        ],
        conjunct_predicates: vec![
            ConjunctPredicate {
                predicate_id: 2,
                conjunct_id: 1,
            },
            ConjunctPredicate {
                predicate_id: 1,
                conjunct_id: 1,
            },
            ConjunctPredicate {
                predicate_id: 1,
                conjunct_id: 2,
            },
        ],
    }
}

#[test]
fn html_report_renders_condition_as_disjunction() {
    let html = render_report(&dataset_fixture(), ReportFormat::Html).expect("render");

    assert!(html.starts_with("<html><head><title>Campaigns</title></head><body>"));
    assert!(html.contains("<h3>Campaign 1</h3>"));
    assert!(html.contains("Jan 3, 2012 &ndash; Jan 10, 2012"));
    assert!(html.contains("<td>1d</td>"));
    assert!(html.contains("<td>fixed</td>"));
    assert!(html.contains(
        "\n[sum(cost this week (all)) &ge; 42.0 &and; sum(cost this week (all)) &lt; 17.0] &or;<br/>\n[sum(cost this week (all)) &ge; 42.0]"
    ));
    assert!(html.trim_end().ends_with("</body></html>"));
}

#[test]
fn markdown_report_lists_conjuncts() {
    let markdown = render_report(&dataset_fixture(), ReportFormat::Markdown).expect("render");

    assert!(markdown.contains("## Campaign 1"));
    assert!(markdown.contains("- validity period: Jan 3, 2012 – Jan 10, 2012"));
    assert!(markdown.contains("  - [sum(cost this week (all)) ≥ 42.0 ∧ sum(cost this week (all)) < 17.0]"));
    assert!(markdown.contains("  - [sum(cost this week (all)) ≥ 42.0]"));
}

#[test]
fn dangling_predicate_fails_rendering() {
    let mut dataset = dataset_fixture();
    dataset.predicates.pop();

    assert!(render_report(&dataset, ReportFormat::Html).is_err());
}

#[test]
fn fixture_metrics() {
    let metrics = collect_dataset_metrics(&dataset_fixture());

    assert_eq!(metrics.pivot_anchored_conjuncts, 2);
    assert_eq!(metrics.shared_predicates, 1);
    assert_eq!(metrics.orphan_predicates, 0);
    assert_eq!(metrics.conjuncts_per_campaign.max, 2);
    assert_eq!(metrics.predicates_per_conjunct.min, 1);
    assert_eq!(metrics.window_days.min, 7);
    assert_eq!(metrics.firing_intervals.get("1d"), Some(&1));
}

#[test]
fn csv_run_round_trips_into_the_same_report() {
    let out_dir = temp_out_dir("load");
    let plan = WorkloadPlan {
        base_campaigns: 20,
        ..WorkloadPlan::default()
    };
    let result = GenerationEngine::new(GenerateOptions {
        out_dir,
        nest_run_dir: true,
        run_id: None,
    })
    .run(&plan)
    .expect("run");

    let loaded = load_dataset_csv(&result.run_dir).expect("load csv");
    assert_eq!(loaded, result.dataset);

    let report_path = result.run_dir.join("campaigns.html");
    let format = write_report(&report_path, &loaded).expect("write report");
    assert_eq!(format, ReportFormat::Html);
    let html = fs::read_to_string(&report_path).expect("read report");
    assert_eq!(html.matches("<h3>Campaign ").count(), 20);

    let metrics = collect_dataset_metrics(&loaded);
    assert!(metrics.window_days.min >= 7 && metrics.window_days.max <= 31);
    assert!(metrics.predicates_per_conjunct.max <= 5);
}

#[test]
fn mismatched_header_is_reported() {
    let out_dir = temp_out_dir("header");
    let result = GenerationEngine::new(GenerateOptions {
        out_dir,
        nest_run_dir: false,
        run_id: None,
    })
    .run(&WorkloadPlan {
        base_campaigns: 2,
        ..WorkloadPlan::default()
    })
    .expect("run");

    fs::write(result.run_dir.join("conjunct.csv"), "id,owner\n1,1\n").expect("rewrite");
    let err = load_dataset_csv(&result.run_dir).expect_err("bad header");
    assert!(err.to_string().contains("conjunct.csv"));
}

#[test]
fn scaled_workload_report_covers_every_conjunct_and_link() {
    let plan = WorkloadPlan {
        scaling_factor: 10,
        ..WorkloadPlan::default()
    };
    let dataset = GenerationEngine::default()
        .generate(&plan)
        .expect("generate")
        .dataset;
    assert_eq!(dataset.campaigns.len(), 3000);

    let markdown = render_report(&dataset, ReportFormat::Markdown).expect("render");

    assert_eq!(markdown.matches("\n## Campaign ").count(), 3000);
    assert_eq!(markdown.matches("  - [").count(), dataset.conjuncts.len());
    assert_eq!(
        markdown.matches(" ∧ ").count(),
        dataset.conjunct_predicates.len() - dataset.conjuncts.len()
    );
}

#[test]
fn conjuncts_render_in_id_order_regardless_of_row_order() {
    let mut dataset = dataset_fixture();
    dataset.conjuncts.reverse();
    dataset.conjunct_predicates.reverse();

    let html = render_report(&dataset, ReportFormat::Html).expect("render");
    assert!(html.contains(
        "\n[sum(cost this week (all)) &ge; 42.0 &and; sum(cost this week (all)) &lt; 17.0] &or;<br/>\n[sum(cost this week (all)) &ge; 42.0]"
    ));
}
