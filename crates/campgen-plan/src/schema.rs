use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::errors::Result;
use crate::model::WorkloadPlan;

/// Emit the JSON Schema for workload plan documents.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(WorkloadPlan)
}

/// The plan JSON Schema as a JSON value, ready for a validator.
pub fn plan_json_schema_value() -> Result<serde_json::Value> {
    Ok(serde_json::to_value(plan_json_schema())?)
}
