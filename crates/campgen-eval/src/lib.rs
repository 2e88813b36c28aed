//! Campaign reports, dataset loading and dataset shape metrics.

pub mod errors;
pub mod load;
pub mod metrics;
pub mod report;

pub use errors::EvalError;
pub use load::load_dataset_csv;
pub use metrics::{
    DatasetMetrics, Distribution, METRICS_VERSION, TableCount, WindowDays,
    collect_dataset_metrics,
};
pub use report::{ReportFormat, render_report, write_report};
