use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use campgen_core::Dataset;

/// Metrics contract version for dataset shape reports.
pub const METRICS_VERSION: &str = "0.1";

const DAY_MILLIS: i64 = 86_400_000;

/// Statistical shape of a generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetrics {
    pub metrics_version: String,
    pub tables: Vec<TableCount>,
    pub conjuncts_per_campaign: Distribution,
    pub predicates_per_conjunct: Distribution,
    /// Conjuncts with at least one predicate over a pivot attribute.
    pub pivot_anchored_conjuncts: u64,
    pub pivot_anchored_pct: f64,
    /// Predicates linked from more than one conjunct.
    pub shared_predicates: u64,
    /// Predicates no conjunct links to.
    pub orphan_predicates: u64,
    pub window_days: WindowDays,
    pub firing_intervals: BTreeMap<String, u64>,
    pub firing_start_conditions: BTreeMap<String, u64>,
    pub operators: BTreeMap<String, u64>,
}

/// Row count of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// Min/mean/max of a per-entity count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

impl Distribution {
    fn from_counts(counts: impl IntoIterator<Item = u64>) -> Self {
        let mut total = 0_u64;
        let mut samples = 0_u64;
        let mut min = u64::MAX;
        let mut max = 0_u64;
        for count in counts {
            total += count;
            samples += 1;
            min = min.min(count);
            max = max.max(count);
        }
        if samples == 0 {
            return Self::default();
        }
        Self {
            min,
            max,
            mean: total as f64 / samples as f64,
        }
    }
}

/// Shortest and longest campaign validity window, in days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDays {
    pub min: i64,
    pub max: i64,
}

/// Collect shape metrics for a dataset.
pub fn collect_dataset_metrics(dataset: &Dataset) -> DatasetMetrics {
    let tables = dataset
        .table_counts()
        .iter()
        .map(|(table, rows)| TableCount {
            table: table.to_string(),
            rows: *rows as u64,
        })
        .collect();

    let mut conjuncts_by_campaign: HashMap<u32, u64> = dataset
        .campaigns
        .iter()
        .map(|campaign| (campaign.id, 0))
        .collect();
    for conjunct in &dataset.conjuncts {
        *conjuncts_by_campaign.entry(conjunct.campaign_id).or_insert(0) += 1;
    }

    let mut links_by_conjunct: HashMap<u32, u64> = dataset
        .conjuncts
        .iter()
        .map(|conjunct| (conjunct.id, 0))
        .collect();
    let mut links_by_predicate: HashMap<u32, u64> = HashMap::new();
    for link in &dataset.conjunct_predicates {
        *links_by_conjunct.entry(link.conjunct_id).or_insert(0) += 1;
        *links_by_predicate.entry(link.predicate_id).or_insert(0) += 1;
    }

    let pivot_attributes: HashSet<u32> = dataset
        .wt_attributes
        .iter()
        .filter(|attribute| attribute.is_pivot)
        .map(|attribute| attribute.id)
        .collect();
    let pivot_predicates: HashSet<u32> = dataset
        .predicates
        .iter()
        .filter(|predicate| pivot_attributes.contains(&predicate.wt_attribute_id))
        .map(|predicate| predicate.id)
        .collect();
    let anchored: HashSet<u32> = dataset
        .conjunct_predicates
        .iter()
        .filter(|link| pivot_predicates.contains(&link.predicate_id))
        .map(|link| link.conjunct_id)
        .collect();
    let pivot_anchored_conjuncts = anchored.len() as u64;

    let window_days = dataset
        .campaigns
        .iter()
        .map(|campaign| (campaign.valid_to - campaign.valid_from) / DAY_MILLIS)
        .fold(None, |acc: Option<WindowDays>, days| {
            Some(match acc {
                None => WindowDays {
                    min: days,
                    max: days,
                },
                Some(window) => WindowDays {
                    min: window.min.min(days),
                    max: window.max.max(days),
                },
            })
        })
        .unwrap_or_default();

    let mut firing_intervals = BTreeMap::new();
    let mut firing_start_conditions = BTreeMap::new();
    for campaign in &dataset.campaigns {
        *firing_intervals
            .entry(campaign.firing_interval.to_string())
            .or_insert(0) += 1;
        *firing_start_conditions
            .entry(campaign.firing_start_condition.to_string())
            .or_insert(0) += 1;
    }
    let mut operators = BTreeMap::new();
    for predicate in &dataset.predicates {
        *operators.entry(predicate.operator.to_string()).or_insert(0) += 1;
    }

    DatasetMetrics {
        metrics_version: METRICS_VERSION.to_string(),
        tables,
        conjuncts_per_campaign: Distribution::from_counts(conjuncts_by_campaign.into_values()),
        predicates_per_conjunct: Distribution::from_counts(links_by_conjunct.into_values()),
        pivot_anchored_conjuncts,
        pivot_anchored_pct: if dataset.conjuncts.is_empty() {
            0.0
        } else {
            pivot_anchored_conjuncts as f64 / dataset.conjuncts.len() as f64
        },
        shared_predicates: links_by_predicate.values().filter(|&&count| count > 1).count() as u64,
        orphan_predicates: dataset
            .predicates
            .iter()
            .filter(|predicate| !links_by_predicate.contains_key(&predicate.id))
            .count() as u64,
        window_days,
        firing_intervals,
        firing_start_conditions,
        operators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_of_nothing_is_zero() {
        assert_eq!(Distribution::from_counts(Vec::new()), Distribution::default());
    }

    #[test]
    fn distribution_tracks_bounds_and_mean() {
        let distribution = Distribution::from_counts([1, 5, 3]);
        assert_eq!(distribution.min, 1);
        assert_eq!(distribution.max, 5);
        assert!((distribution.mean - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_dataset_has_empty_metrics() {
        let metrics = collect_dataset_metrics(&Dataset::default());
        assert_eq!(metrics.tables.len(), 7);
        assert_eq!(metrics.pivot_anchored_pct, 0.0);
        assert_eq!(metrics.window_days, WindowDays::default());
        assert!(metrics.firing_intervals.is_empty());
    }
}
