use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use campgen_eval::DatasetMetrics;

use super::{RegistryError, RegistryResult};

/// Plan values a run was started with.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub plan_version: String,
    pub source: Option<PathBuf>,
    pub seed: u64,
    pub scaling_factor: u32,
    pub campaigns: u32,
    pub wt_attributes: u64,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub out_dir: PathBuf,
    pub report: PathBuf,
    pub instance: String,
    /// Redacted connection URL; absent for CSV-only runs.
    pub connection: Option<String>,
    pub dataset_version: String,
    pub plan: PlanSummary,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub instance: String,
    pub connection: Option<String>,
    pub dataset_version: String,
    pub plan: PlanSummary,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub run_root: PathBuf,
    pub logs_path: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx
        .out_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&run_root)?;

    let config_path = run_root.join("config.json");
    let logs_path = run_root.join("logs.ndjson");
    let metrics_path = run_root.join("metrics.json");
    let report_path = if ctx.report.is_absolute() {
        ctx.report.clone()
    } else {
        run_root.join(&ctx.report)
    };

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        instance: ctx.instance.clone(),
        connection: ctx.connection.clone(),
        dataset_version: ctx.dataset_version.clone(),
        plan: ctx.plan.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        run_root,
        logs_path,
        metrics_path,
        report_path,
    })
}

pub fn write_metrics(paths: &RunPaths, metrics: &DatasetMetrics) -> RegistryResult<()> {
    write_json(&paths.metrics_path, metrics)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
