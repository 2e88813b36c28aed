use campgen_core::{AggregationFn, DataType, WindowSize};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current plan contract version.
pub const PLAN_VERSION: &str = "0.1";

/// Complete description of a workload to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkloadPlan {
    pub plan_version: String,
    /// Seed of the random sequence.
    #[serde(default)]
    pub seed: u64,
    /// Multiplier applied to `base_campaigns`.
    #[serde(default = "default_scaling_factor")]
    pub scaling_factor: u32,
    /// Campaigns generated at scaling factor 1.
    #[serde(default = "default_base_campaigns")]
    pub base_campaigns: u32,
    #[serde(default)]
    pub attributes: AttributeSpec,
    #[serde(default)]
    pub limits: LimitSpec,
    /// Metric table the attribute catalog is built from, in id order.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricSpec>,
}

/// Parameters of the windowed-attribute catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttributeSpec {
    /// How many times the whole catalog is repeated.
    pub repetitions: u32,
    /// Attributes with ids `1..=pivot_attributes` are pivot attributes.
    pub pivot_attributes: u32,
    pub window_sizes: Vec<WindowSize>,
    /// Functions applied to gauge metrics; counters are always summed.
    pub aggregation_functions: Vec<AggregationFn>,
}

impl Default for AttributeSpec {
    fn default() -> Self {
        Self {
            repetitions: 1,
            pivot_attributes: 20,
            window_sizes: vec![WindowSize::Day, WindowSize::Week],
            aggregation_functions: vec![AggregationFn::Sum, AggregationFn::Min, AggregationFn::Max],
        }
    }
}

/// Upper bounds for the random fan-out of campaigns and conjuncts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LimitSpec {
    pub max_conjuncts_per_campaign: u32,
    pub max_predicates_per_conjunct: u32,
}

impl Default for LimitSpec {
    fn default() -> Self {
        Self {
            max_conjuncts_per_campaign: 5,
            max_predicates_per_conjunct: 5,
        }
    }
}

/// One row of the metric table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricSpec {
    pub id: u32,
    pub name: String,
    pub data_type: DataType,
    pub scope: MetricScope,
    pub role: MetricRole,
}

/// Call population a metric is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricScope {
    All,
    Local,
    NonLocal,
}

/// How a metric is aggregated by the attribute catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricRole {
    /// Aggregated with every configured function.
    Gauge,
    /// Summed only.
    Counter,
}

impl WorkloadPlan {
    /// Total campaigns to generate, `None` on overflow.
    pub fn campaign_count(&self) -> Option<u32> {
        self.base_campaigns.checked_mul(self.scaling_factor)
    }

    /// Number of windowed attributes the catalog derives from this plan.
    pub fn wt_attribute_count(&self) -> u64 {
        let gauges = self
            .metrics
            .iter()
            .filter(|metric| metric.role == MetricRole::Gauge)
            .count() as u64;
        let counters = self.metrics.len() as u64 - gauges;
        let per_window = gauges * self.attributes.aggregation_functions.len() as u64 + counters;
        u64::from(self.attributes.repetitions)
            * self.attributes.window_sizes.len() as u64
            * per_window
    }

    /// Distinct scopes in metric-table order.
    pub fn scopes(&self) -> Vec<MetricScope> {
        let mut scopes = Vec::new();
        for metric in &self.metrics {
            if !scopes.contains(&metric.scope) {
                scopes.push(metric.scope);
            }
        }
        scopes
    }
}

impl Default for WorkloadPlan {
    fn default() -> Self {
        Self {
            plan_version: PLAN_VERSION.to_string(),
            seed: 0,
            scaling_factor: default_scaling_factor(),
            base_campaigns: default_base_campaigns(),
            attributes: AttributeSpec::default(),
            limits: LimitSpec::default(),
            metrics: default_metrics(),
        }
    }
}

fn default_scaling_factor() -> u32 {
    1
}

fn default_base_campaigns() -> u32 {
    300
}

fn default_metrics() -> Vec<MetricSpec> {
    const TABLE: [(&str, DataType, MetricScope, MetricRole); 9] = [
        ("cost", DataType::Double, MetricScope::All, MetricRole::Gauge),
        ("call", DataType::Uint, MetricScope::All, MetricRole::Counter),
        ("duration", DataType::Uint, MetricScope::All, MetricRole::Gauge),
        ("local cost", DataType::Double, MetricScope::Local, MetricRole::Gauge),
        ("local call", DataType::Uint, MetricScope::Local, MetricRole::Counter),
        ("local duration", DataType::Uint, MetricScope::Local, MetricRole::Gauge),
        ("non local cost", DataType::Double, MetricScope::NonLocal, MetricRole::Gauge),
        ("non local call", DataType::Uint, MetricScope::NonLocal, MetricRole::Counter),
        ("non local duration", DataType::Uint, MetricScope::NonLocal, MetricRole::Gauge),
    ];

    TABLE
        .iter()
        .enumerate()
        .map(|(index, (name, data_type, scope, role))| MetricSpec {
            id: index as u32 + 1,
            name: (*name).to_string(),
            data_type: *data_type,
            scope: *scope,
            role: *role,
        })
        .collect()
}
