use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{info, warn};

use campgen_core::{
    Campaign, Conjunct, ConjunctPredicate, Constant, Dataset, Metric, Predicate, Row, WtAttribute,
};

use crate::errors::{Result, StoreError};
use crate::options::StoreOptions;
use crate::sink::{PersistReport, Sink};

pub mod schema;
pub mod writes;

/// Sink for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Create a new sink using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(options: &StoreOptions) -> Result<Self> {
        let connect_options = PgConnectOptions::new()
            .host(&options.host)
            .port(options.port)
            .database(&options.database)
            .username(&options.user)
            .password(&options.password);

        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
            .connect_with(connect_options)
            .await
            .map_err(|err| StoreError::Connect(err.to_string()))?;

        info!(url = %options.redacted_url(), "connected to postgres");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop the entity tables if present.
    pub async fn drop_schema(&self) -> Result<()> {
        for table in schema::DROP_ORDER {
            sqlx::query(&format!("drop table if exists {table}"))
                .execute(&self.pool)
                .await
                .map_err(|err| StoreError::Schema(err.to_string()))?;
        }
        Ok(())
    }

    async fn persist_catalog(&self, dataset: &Dataset, report: &mut PersistReport) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(begin_error(Metric::TABLE))?;
        let metrics = writes::insert_metrics(&mut *tx, &dataset.metrics).await?;
        let attributes = writes::insert_wt_attributes(&mut *tx, &dataset.wt_attributes).await?;
        tx.commit().await.map_err(commit_error(WtAttribute::TABLE))?;

        report.add_rows(Metric::TABLE, metrics);
        report.add_rows(WtAttribute::TABLE, attributes);
        info!(metrics, wt_attributes = attributes, "catalog persisted");
        Ok(())
    }

    async fn persist_pools(&self, dataset: &Dataset, report: &mut PersistReport) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(begin_error(Constant::TABLE))?;
        let constants = writes::insert_constants(&mut *tx, &dataset.constants).await?;
        let predicates = writes::insert_predicates(&mut *tx, &dataset.predicates).await?;
        tx.commit().await.map_err(commit_error(Predicate::TABLE))?;

        report.add_rows(Constant::TABLE, constants);
        report.add_rows(Predicate::TABLE, predicates);
        info!(constants, predicates, "pools persisted");
        Ok(())
    }

    async fn persist_campaign(
        &self,
        campaign: &Campaign,
        conjuncts: &[&Conjunct],
        links: &[&ConjunctPredicate],
    ) -> Result<(u64, u64)> {
        let mut tx = self.pool.begin().await.map_err(begin_error(Campaign::TABLE))?;
        writes::insert_campaign(&mut *tx, campaign).await?;
        let conjunct_rows = writes::insert_conjuncts(&mut *tx, conjuncts).await?;
        let link_rows = writes::insert_links(&mut *tx, links).await?;
        tx.commit().await.map_err(commit_error(Campaign::TABLE))?;
        Ok((conjunct_rows, link_rows))
    }
}

#[async_trait]
impl Sink for PostgresSink {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn create_schema(&self) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StoreError::Schema(err.to_string()))?;
        for statement in schema::CREATE_TABLES {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|err| StoreError::Schema(err.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|err| StoreError::Schema(err.to_string()))?;
        info!(tables = schema::CREATE_TABLES.len(), "schema created");
        Ok(())
    }

    async fn persist(&self, dataset: &Dataset) -> Result<PersistReport> {
        let mut report = PersistReport::default();
        self.persist_catalog(dataset, &mut report).await?;
        self.persist_pools(dataset, &mut report).await?;

        let mut conjuncts_by_campaign: BTreeMap<u32, Vec<&Conjunct>> = BTreeMap::new();
        for conjunct in &dataset.conjuncts {
            conjuncts_by_campaign
                .entry(conjunct.campaign_id)
                .or_default()
                .push(conjunct);
        }
        let mut links_by_conjunct: BTreeMap<u32, Vec<&ConjunctPredicate>> = BTreeMap::new();
        for link in &dataset.conjunct_predicates {
            links_by_conjunct
                .entry(link.conjunct_id)
                .or_default()
                .push(link);
        }

        for campaign in &dataset.campaigns {
            let conjuncts = conjuncts_by_campaign
                .get(&campaign.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let links: Vec<&ConjunctPredicate> = conjuncts
                .iter()
                .filter_map(|conjunct| links_by_conjunct.get(&conjunct.id))
                .flatten()
                .copied()
                .collect();

            match self.persist_campaign(campaign, conjuncts, &links).await {
                Ok((conjunct_rows, link_rows)) => {
                    report.add_rows(Campaign::TABLE, 1);
                    report.add_rows(Conjunct::TABLE, conjunct_rows);
                    report.add_rows(ConjunctPredicate::TABLE, link_rows);
                    report.campaigns_committed += 1;
                }
                Err(err) => {
                    warn!(campaign_id = campaign.id, error = %err, "campaign rolled back");
                    report.failed_campaigns.push(campaign.id);
                }
            }
        }

        info!(
            campaigns_committed = report.campaigns_committed,
            failed_campaigns = report.failed_campaigns.len(),
            "dataset persisted"
        );
        Ok(report)
    }
}

fn begin_error(table: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |err| StoreError::Write {
        table,
        message: format!("begin: {err}"),
    }
}

fn commit_error(table: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |err| StoreError::Write {
        table,
        message: format!("commit: {err}"),
    }
}
