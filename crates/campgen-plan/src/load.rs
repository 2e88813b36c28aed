use std::path::Path;

use serde_json::Value;

use crate::errors::{PlanError, Result};
use crate::validate::{ValidatedPlan, validate_plan};

/// Load and validate a plan file. `.toml` files are read as TOML, anything
/// else as JSON; both go through the same JSON Schema validation.
pub fn load_plan(path: &Path) -> Result<ValidatedPlan> {
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let plan_json: Value = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_plan(&plan_json).map_err(PlanError::Invalid)
}
