mod params;
mod registry;

use std::time::Instant;

use campgen_core::DATASET_VERSION;
use campgen_eval::{collect_dataset_metrics, write_report};
use campgen_generate::{GenerateOptions, GenerationEngine, GenerationError};
use campgen_plan::{PlanError, WorkloadPlan, load_plan, validate_workload};
use campgen_store::{StoreError, connect_sink};
use clap::Parser;
use params::{InvalidParam, parse_params};
use registry::{PlanSummary, RunContext, init_run_logging, start_run, write_metrics};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidParam {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(
        "run incomplete: {generation_failed} campaign(s) with abandoned conjuncts, {persist_failed} campaign(s) not persisted"
    )]
    Incomplete {
        generation_failed: usize,
        persist_failed: usize,
    },
}

impl From<InvalidParam> for CliError {
    fn from(err: InvalidParam) -> Self {
        Self::InvalidParam {
            key: err.key,
            value: err.value,
            expected: err.expected,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "campgen",
    version,
    about = "Campaign benchmark dataset generator",
    long_about = "Generates a deterministic campaign workload and loads it into a database.\n\
                  Keys: instance, host, port, database, user, password, scaling-factor, seed, \
                  plan, out-dir, report."
)]
struct Cli {
    /// Parameter overrides. Tokens that are not `key=value` are reported
    /// and ignored, including ones that look like flags.
    #[arg(value_name = "KEY=VALUE", allow_hyphen_values = true)]
    params: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let parsed = parse_params(&cli.params)?;
    let params = parsed.params;

    let (mut plan, plan_warnings) = match &params.plan {
        Some(path) => {
            let validated = load_plan(path)?;
            (validated.plan, validated.warnings)
        }
        None => (WorkloadPlan::default(), Vec::new()),
    };
    if let Some(seed) = params.seed {
        plan.seed = seed;
    }
    if let Some(scaling_factor) = params.scaling_factor {
        plan.scaling_factor = scaling_factor;
    }
    let validation = validate_workload(&plan);
    if !validation.is_ok() {
        return Err(CliError::InvalidPlan(validation.to_string()));
    }
    let campaigns = plan
        .campaign_count()
        .ok_or_else(|| CliError::InvalidPlan("campaign count overflows".to_string()))?;

    let run_id = Uuid::new_v4().to_string();
    let connection = (!params.csv_only()).then(|| params.store.redacted_url());
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        out_dir: params.out_dir.clone(),
        report: params.report.clone(),
        instance: params.store.instance.clone(),
        connection: connection.clone(),
        dataset_version: DATASET_VERSION.to_string(),
        plan: PlanSummary {
            plan_version: plan.plan_version.clone(),
            source: params.plan.clone(),
            seed: plan.seed,
            scaling_factor: plan.scaling_factor,
            campaigns,
            wt_attributes: plan.wt_attribute_count(),
        },
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    for skipped in &parsed.skipped {
        tracing::warn!(
            event = "param_skipped",
            token = %skipped.token,
            reason = skipped.reason.as_str()
        );
    }
    for issue in plan_warnings.iter().chain(validation.warnings.iter()) {
        tracing::warn!(
            event = "plan_warning",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        instance = %run_ctx.instance,
        connection = connection.as_deref().unwrap_or("none"),
        seed = plan.seed,
        scaling_factor = plan.scaling_factor,
        campaigns = campaigns
    );

    let timer = Instant::now();

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: run_paths.run_root.clone(),
        nest_run_dir: false,
        run_id: Some(run_id.clone()),
    });
    let generated = engine.run(&plan)?;
    let generation_failed = generated.report.failed_campaigns.len();

    let mut persist_failed = 0;
    if params.csv_only() {
        tracing::info!(event = "store_skipped", instance = "csv");
    } else {
        let sink = connect_sink(&params.store).await?;
        tracing::info!(event = "store_connected", engine = sink.engine());
        sink.create_schema().await?;
        tracing::info!(event = "schema_created", engine = sink.engine());

        let persisted = sink.persist(&generated.dataset).await?;
        persist_failed = persisted.failed_campaigns.len();
        tracing::info!(
            event = "dataset_persisted",
            campaigns_committed = persisted.campaigns_committed,
            failed_campaigns = persist_failed
        );
    }

    match write_report(&run_paths.report_path, &generated.dataset) {
        Ok(format) => tracing::info!(
            event = "report_written",
            path = %run_paths.report_path.display(),
            format = ?format
        ),
        Err(err) => tracing::warn!(
            event = "report_failed",
            path = %run_paths.report_path.display(),
            error = %err
        ),
    }

    let metrics = collect_dataset_metrics(&generated.dataset);
    write_metrics(&run_paths, &metrics)?;
    tracing::info!(event = "metrics_written", path = %run_paths.metrics_path.display());

    let duration_ms = timer.elapsed().as_millis() as u64;
    if generation_failed > 0 || persist_failed > 0 {
        tracing::warn!(
            event = "run_finished",
            status = "incomplete",
            duration_ms = duration_ms,
            generation_failed = generation_failed,
            persist_failed = persist_failed
        );
        return Err(CliError::Incomplete {
            generation_failed,
            persist_failed,
        });
    }

    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use params::SkipReason;

    #[test]
    fn flag_like_tokens_are_skipped_not_rejected() {
        let cli = Cli::try_parse_from(["campgen", "--verbose", "seed=1", "-x"]).expect("parse cli");
        assert_eq!(cli.params, vec!["--verbose", "seed=1", "-x"]);

        let parsed = parse_params(&cli.params).expect("parse params");
        assert_eq!(parsed.params.seed, Some(1));
        assert_eq!(parsed.skipped.len(), 2);
        assert!(
            parsed
                .skipped
                .iter()
                .all(|skip| skip.reason == SkipReason::Malformed)
        );
    }

    #[test]
    fn no_tokens_is_the_default_run() {
        let cli = Cli::try_parse_from(["campgen"]).expect("parse cli");
        assert!(cli.params.is_empty());
    }
}
