//! Workload plan contracts and validation.
//!
//! A plan fixes every constant that shapes a generated dataset: the metric
//! table, the windowed-attribute catalog parameters, the campaign count and
//! the seed.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use load::load_plan;
pub use model::{
    AttributeSpec, LimitSpec, MetricRole, MetricScope, MetricSpec, PLAN_VERSION, WorkloadPlan,
};
pub use schema::{plan_json_schema, plan_json_schema_value};
pub use validate::{ValidatedPlan, validate_plan, validate_plan_json, validate_workload};
