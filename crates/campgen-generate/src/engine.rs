use std::path::PathBuf;
use std::time::Instant;

use campgen_core::Dataset;
use campgen_plan::{WorkloadPlan, validate_workload};
use tracing::{info, warn};

use crate::campaign::build_campaign;
use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, GenerationReport, TableReport};
use crate::output::csv::write_dataset_csv;

/// In-memory result of [`GenerationEngine::generate`].
#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Result of a generation run written to disk.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub run_dir: PathBuf,
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Entry point for generating campaign datasets from a workload plan.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Build the full entity graph for `plan` without touching the disk.
    ///
    /// Campaigns are built in ascending id order from one seeded context.
    /// Abandoned conjuncts do not stop the run; they are reported through
    /// `failed_conjuncts` and `failed_campaigns`.
    pub fn generate(&self, plan: &WorkloadPlan) -> Result<GeneratedDataset, GenerationError> {
        let start = Instant::now();
        let validation = validate_workload(plan);
        if !validation.is_ok() {
            return Err(GenerationError::InvalidPlan(validation.to_string()));
        }
        let campaign_count = plan.campaign_count().ok_or_else(|| {
            GenerationError::InvalidPlan("campaign count overflows u32".to_string())
        })?;

        let run_id = self
            .options
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut ctx = GenerationContext::new(plan)?;
        let mut report = GenerationReport::new(run_id.clone());
        report.seed = plan.seed;
        report.scaling_factor = plan.scaling_factor;
        report.campaigns_requested = campaign_count;
        report.wt_attribute_count = ctx.catalog().attributes().len() as u64;
        report.record_size_bytes = ctx.catalog().record_size_bytes();

        info!(
            run_id = %run_id,
            seed = plan.seed,
            scaling_factor = plan.scaling_factor,
            campaigns = campaign_count,
            wt_attributes = report.wt_attribute_count,
            record_size_bytes = report.record_size_bytes,
            "generation started"
        );

        for campaign_id in 1..=campaign_count {
            let outcome = build_campaign(&mut ctx, campaign_id);
            report.campaigns_generated += 1;
            if !outcome.is_complete() {
                report.failed_conjuncts += u64::from(outcome.conjuncts_failed);
                report.failed_campaigns.push(campaign_id);
            }
        }

        report.random_draws = ctx.random_draws();
        report.collapsed_links = ctx.collapsed_links();
        for issue in std::mem::take(&mut ctx.issues) {
            report.record_warning(issue);
        }

        let dataset = ctx.into_dataset();
        report.tables = dataset
            .table_counts()
            .iter()
            .map(|(table, rows)| TableReport {
                table: table.to_string(),
                rows: *rows as u64,
                bytes: 0,
            })
            .collect();
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.failed_campaigns.is_empty() {
            info!(
                run_id = %run_id,
                campaigns = report.campaigns_generated,
                constants = dataset.constants.len(),
                predicates = dataset.predicates.len(),
                conjuncts = dataset.conjuncts.len(),
                duration_ms = report.duration_ms,
                "generation completed"
            );
        } else {
            warn!(
                run_id = %run_id,
                failed_campaigns = report.failed_campaigns.len(),
                failed_conjuncts = report.failed_conjuncts,
                "generation completed with abandoned conjuncts"
            );
        }

        Ok(GeneratedDataset { dataset, report })
    }

    /// Generate `plan` and write the run artifacts: `resolved_plan.json`, one
    /// CSV per table and `generation_report.json`.
    pub fn run(&self, plan: &WorkloadPlan) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let GeneratedDataset {
            dataset,
            mut report,
        } = self.generate(plan)?;

        let run_dir = if self.options.nest_run_dir {
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
            self.options
                .out_dir
                .join(format!("{timestamp}__run_{}", report.run_id))
        } else {
            self.options.out_dir.clone()
        };
        std::fs::create_dir_all(&run_dir)?;

        let plan_path = run_dir.join("resolved_plan.json");
        std::fs::write(&plan_path, serde_json::to_vec_pretty(plan)?)?;

        let tables = write_dataset_csv(&run_dir, &dataset)?;
        for table in &tables {
            info!(
                table = %table.table,
                rows = table.rows,
                bytes = table.bytes,
                "table written"
            );
        }
        report.bytes_written = tables.iter().map(|table| table.bytes).sum();
        report.tables = tables;
        report.duration_ms = start.elapsed().as_millis() as u64;

        let report_path = run_dir.join("generation_report.json");
        std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;

        info!(
            run_id = %report.run_id,
            run_dir = %run_dir.display(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "run artifacts written"
        );

        Ok(GenerationResult {
            run_dir,
            dataset,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_generates_300_campaigns() {
        let generated = GenerationEngine::default()
            .generate(&WorkloadPlan::default())
            .expect("generate");

        assert_eq!(generated.dataset.campaigns.len(), 300);
        assert_eq!(generated.report.campaigns_generated, 300);
        assert!(generated.report.is_complete());
        assert_eq!(generated.report.wt_attribute_count, 42);
        assert_eq!(generated.report.record_size_bytes, 240);
        assert_eq!(
            generated.report.table("campaign").map(|table| table.rows),
            Some(300)
        );
    }

    #[test]
    fn rejects_invalid_plan_before_drawing() {
        let plan = WorkloadPlan {
            scaling_factor: 0,
            ..WorkloadPlan::default()
        };

        let err = GenerationEngine::default()
            .generate(&plan)
            .expect_err("zero scaling factor");
        assert!(matches!(err, GenerationError::InvalidPlan(_)));
    }

    #[test]
    fn fixed_run_id_is_reported() {
        let engine = GenerationEngine::new(GenerateOptions {
            run_id: Some("fixed".to_string()),
            ..GenerateOptions::default()
        });
        let plan = WorkloadPlan {
            base_campaigns: 3,
            ..WorkloadPlan::default()
        };

        let generated = engine.generate(&plan).expect("generate");
        assert_eq!(generated.report.run_id, "fixed");
        assert!(generated.report.random_draws > 0);
    }
}
