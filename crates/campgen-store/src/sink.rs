use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use campgen_core::Dataset;

use crate::errors::{Result, StoreError};
use crate::options::StoreOptions;
use crate::postgres::PostgresSink;

/// Outcome of persisting one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistReport {
    /// Rows committed per table.
    pub rows: BTreeMap<String, u64>,
    pub campaigns_committed: u64,
    /// Campaigns whose transaction was rolled back.
    pub failed_campaigns: Vec<u32>,
}

impl PersistReport {
    pub fn add_rows(&mut self, table: &str, rows: u64) {
        *self.rows.entry(table.to_string()).or_insert(0) += rows;
    }

    pub fn is_complete(&self) -> bool {
        self.failed_campaigns.is_empty()
    }
}

/// Trait implemented by stores that can hold a generated dataset.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Create the seven entity tables. Fails if they already exist.
    async fn create_schema(&self) -> Result<()>;

    /// Write `dataset` in foreign-key order.
    ///
    /// Catalog and pool rows are all-or-nothing; campaigns commit one by one
    /// and a failed campaign is rolled back and reported without stopping
    /// the rest.
    async fn persist(&self, dataset: &Dataset) -> Result<PersistReport>;
}

/// Connect the sink named by `options.instance`.
pub async fn connect_sink(options: &StoreOptions) -> Result<Box<dyn Sink>> {
    match options.instance.as_str() {
        "postgres" | "postgresql" => Ok(Box::new(PostgresSink::connect(options).await?)),
        other => Err(StoreError::UnsupportedInstance(other.to_string())),
    }
}
