use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{PlanError, ValidationIssue, ValidationReport};
use crate::model::{MetricRole, PLAN_VERSION, WorkloadPlan};
use crate::schema::plan_json_schema_value;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: WorkloadPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Check the semantic constraints the JSON Schema cannot express.
pub fn validate_workload(plan: &WorkloadPlan) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.plan_version != PLAN_VERSION {
        report.push(ValidationIssue::warning(
            "plan_version_mismatch",
            "/plan_version",
            format!(
                "plan version '{}' differs from supported '{PLAN_VERSION}'",
                plan.plan_version
            ),
        ));
    }

    validate_campaigns(plan, &mut report);
    validate_metrics(plan, &mut report);
    validate_attributes(plan, &mut report);

    if plan.limits.max_conjuncts_per_campaign == 0 {
        report.push(ValidationIssue::error(
            "limit_zero",
            "/limits/max_conjuncts_per_campaign",
            "every campaign needs at least one conjunct",
        ));
    }
    if plan.limits.max_predicates_per_conjunct == 0 {
        report.push(ValidationIssue::error(
            "limit_zero",
            "/limits/max_predicates_per_conjunct",
            "every conjunct needs at least one predicate",
        ));
    }

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(plan_json: &Value) -> Result<ValidatedPlan, ValidationReport> {
    let structural = plan_json_schema_value()
        .and_then(|schema| validate_plan_json(plan_json, &schema))
        .map_err(|err| {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            report
        })?;

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: WorkloadPlan = serde_json::from_value(plan_json.clone()).map_err(|err| {
        let mut report = ValidationReport::default();
        report.push(ValidationIssue::error("invalid_plan_json", "/", err.to_string()));
        report
    })?;

    let semantic = validate_workload(&plan);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: semantic.warnings,
    })
}

fn validate_campaigns(plan: &WorkloadPlan, report: &mut ValidationReport) {
    if plan.scaling_factor == 0 {
        report.push(ValidationIssue::error(
            "scaling_factor_zero",
            "/scaling_factor",
            "scaling factor must be at least 1",
        ));
    }
    if plan.base_campaigns == 0 {
        report.push(ValidationIssue::error(
            "base_campaigns_zero",
            "/base_campaigns",
            "base campaign count must be at least 1",
        ));
    }
    if plan.campaign_count().is_none() {
        report.push(
            ValidationIssue::error(
                "campaign_count_overflow",
                "/scaling_factor",
                format!(
                    "{} campaigns x scaling factor {} overflows",
                    plan.base_campaigns, plan.scaling_factor
                ),
            )
            .with_hint("lower the scaling factor"),
        );
    }
}

fn validate_metrics(plan: &WorkloadPlan, report: &mut ValidationReport) {
    if plan.metrics.is_empty() {
        report.push(ValidationIssue::error(
            "metrics_empty",
            "/metrics",
            "metric table must not be empty",
        ));
        return;
    }

    let mut names = HashSet::new();
    for (index, metric) in plan.metrics.iter().enumerate() {
        let expected = index as u32 + 1;
        if metric.id != expected {
            report.push(
                ValidationIssue::error(
                    "metric_id_sequence",
                    format!("/metrics/{index}/id"),
                    format!("metric id {} found where {expected} was expected", metric.id),
                )
                .with_hint("metric ids are 1-based and follow table order"),
            );
        }
        if !names.insert(metric.name.as_str()) {
            report.push(ValidationIssue::error(
                "metric_name_duplicate",
                format!("/metrics/{index}/name"),
                format!("metric name '{}' appears twice", metric.name),
            ));
        }
        if metric.role == MetricRole::Counter && metric.data_type != campgen_core::DataType::Uint {
            report.push(ValidationIssue::warning(
                "counter_not_uint",
                format!("/metrics/{index}/data_type"),
                format!("counter metric '{}' is not a uint", metric.name),
            ));
        }
    }
}

fn validate_attributes(plan: &WorkloadPlan, report: &mut ValidationReport) {
    let attributes = &plan.attributes;

    if attributes.repetitions == 0 {
        report.push(ValidationIssue::error(
            "repetitions_zero",
            "/attributes/repetitions",
            "the attribute catalog must be emitted at least once",
        ));
    }
    if attributes.window_sizes.is_empty() {
        report.push(ValidationIssue::error(
            "window_sizes_empty",
            "/attributes/window_sizes",
            "at least one window size is required",
        ));
    }
    if has_duplicates(&attributes.window_sizes) {
        report.push(ValidationIssue::error(
            "window_size_duplicate",
            "/attributes/window_sizes",
            "window sizes must be distinct",
        ));
    }
    if attributes.aggregation_functions.is_empty() {
        report.push(ValidationIssue::error(
            "aggregation_functions_empty",
            "/attributes/aggregation_functions",
            "at least one aggregation function is required",
        ));
    }
    if has_duplicates(&attributes.aggregation_functions) {
        report.push(ValidationIssue::error(
            "aggregation_function_duplicate",
            "/attributes/aggregation_functions",
            "aggregation functions must be distinct",
        ));
    }

    let total = plan.wt_attribute_count();
    let pivots = u64::from(attributes.pivot_attributes);
    if pivots == 0 {
        report.push(ValidationIssue::error(
            "pivot_attributes_zero",
            "/attributes/pivot_attributes",
            "at least one pivot attribute is required",
        ));
    } else if pivots >= total {
        report.push(
            ValidationIssue::error(
                "pivot_attributes_exhaust_catalog",
                "/attributes/pivot_attributes",
                format!("{pivots} pivot attributes leave none of {total} attributes non-pivot"),
            )
            .with_hint("non-pivot predicates need at least one non-pivot attribute"),
        );
    }
    if total > u64::from(u32::MAX) {
        report.push(ValidationIssue::error(
            "attribute_count_overflow",
            "/attributes/repetitions",
            format!("{total} attributes exceed the id range"),
        ));
    }
}

fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(index, item)| items[..index].contains(item))
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
