use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where run artifacts are written.
    pub out_dir: PathBuf,
    /// Create a `<timestamp>__run_<uuid>` directory below `out_dir`; when
    /// false, artifacts go straight into `out_dir`.
    pub nest_run_dir: bool,
    /// Run id to stamp on the report; a fresh UUID is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("runs"),
            nest_run_dir: true,
            run_id: None,
        }
    }
}

/// Summary of one written table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
    #[serde(default)]
    pub bytes: u64,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunct_id: Option<u32>,
}

impl GenerationIssue {
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.to_string(),
            message: message.into(),
            campaign_id: None,
            conjunct_id: None,
        }
    }

    pub fn for_conjunct(mut self, campaign_id: u32, conjunct_id: u32) -> Self {
        self.campaign_id = Some(campaign_id);
        self.conjunct_id = Some(conjunct_id);
        self
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub scaling_factor: u32,
    pub campaigns_requested: u32,
    pub campaigns_generated: u32,
    pub wt_attribute_count: u64,
    pub record_size_bytes: u64,
    pub random_draws: u64,
    pub failed_conjuncts: u64,
    /// Campaigns with at least one abandoned conjunct.
    pub failed_campaigns: Vec<u32>,
    pub collapsed_links: u64,
    pub tables: Vec<TableReport>,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            seed: 0,
            scaling_factor: 0,
            campaigns_requested: 0,
            campaigns_generated: 0,
            wt_attribute_count: 0,
            record_size_bytes: 0,
            random_draws: 0,
            failed_conjuncts: 0,
            failed_campaigns: Vec::new(),
            collapsed_links: 0,
            tables: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    /// True when every requested campaign was built without abandoned conjuncts.
    pub fn is_complete(&self) -> bool {
        self.failed_campaigns.is_empty() && self.campaigns_generated == self.campaigns_requested
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }
}
