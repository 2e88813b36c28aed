use thiserror::Error;

/// Errors emitted while loading, measuring or rendering a dataset.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("{table}.csv has columns {found:?}, expected {expected:?}")]
    UnexpectedColumns {
        table: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("{table}.csv line {line}: {source}")]
    Row {
        table: &'static str,
        line: u64,
        #[source]
        source: campgen_core::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
