use std::num::NonZeroU32;

use campgen_core::{AggregationFn, DataType, Metric, WindowSize, WindowType, WtAttribute};
use campgen_plan::{MetricRole, WorkloadPlan};

use crate::errors::GenerationError;

/// Metrics and windowed attributes derived from a plan.
///
/// The catalog is a pure function of the plan; it never touches the random
/// sequence. Attribute ids are assigned in emission order, which is
/// repetition, window size, metric scope, then gauges (every aggregation
/// function) before counters (sum only).
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    metrics: Vec<Metric>,
    pub(crate) attributes: Vec<WtAttribute>,
    pivot_count: NonZeroU32,
    non_pivot_count: NonZeroU32,
}

impl AttributeCatalog {
    pub fn build(plan: &WorkloadPlan) -> Result<Self, GenerationError> {
        let metrics: Vec<Metric> = plan
            .metrics
            .iter()
            .map(|spec| Metric {
                id: spec.id,
                name: spec.name.clone(),
                data_type: spec.data_type,
            })
            .collect();

        let pivots = plan.attributes.pivot_attributes;
        let mut attributes = Vec::new();
        let mut next_id = 0_u32;
        let mut emit = |metric_id: u32,
                        window_size: WindowSize,
                        aggregation_fn: AggregationFn,
                        data_type: DataType| {
            next_id += 1;
            attributes.push(WtAttribute {
                id: next_id,
                metric_id,
                is_pivot: next_id <= pivots,
                window_type: WindowType::Tumbling,
                window_size,
                aggregation_fn,
                aggregation_data_type: data_type,
            });
        };

        let scopes = plan.scopes();
        for _ in 0..plan.attributes.repetitions {
            for &window_size in &plan.attributes.window_sizes {
                for &scope in &scopes {
                    let in_scope = || plan.metrics.iter().filter(move |spec| spec.scope == scope);
                    for spec in in_scope().filter(|spec| spec.role == MetricRole::Gauge) {
                        for &aggregation_fn in &plan.attributes.aggregation_functions {
                            emit(spec.id, window_size, aggregation_fn, spec.data_type);
                        }
                    }
                    for spec in in_scope().filter(|spec| spec.role == MetricRole::Counter) {
                        emit(spec.id, window_size, AggregationFn::Sum, spec.data_type);
                    }
                }
            }
        }

        Self::from_parts(metrics, attributes, pivots)
    }

    /// Assemble a catalog from explicit rows; `pivots` leading attributes are
    /// pivot attributes and at least one non-pivot attribute must remain.
    pub fn from_parts(
        metrics: Vec<Metric>,
        attributes: Vec<WtAttribute>,
        pivots: u32,
    ) -> Result<Self, GenerationError> {
        let total = u32::try_from(attributes.len()).map_err(|_| {
            GenerationError::InvalidPlan("attribute catalog exceeds the id range".to_string())
        })?;
        let pivot_count = NonZeroU32::new(pivots).ok_or_else(|| {
            GenerationError::InvalidPlan("at least one pivot attribute is required".to_string())
        })?;
        let non_pivot_count = total
            .checked_sub(pivots)
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                GenerationError::InvalidPlan(format!(
                    "{pivots} pivot attributes leave no non-pivot attribute among {total}"
                ))
            })?;

        Ok(Self {
            metrics,
            attributes,
            pivot_count,
            non_pivot_count,
        })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn attributes(&self) -> &[WtAttribute] {
        &self.attributes
    }

    /// Aggregation type of an attribute, looked up by id.
    pub fn aggregation_data_type(&self, attribute_id: u32) -> Option<DataType> {
        let index = attribute_id.checked_sub(1)? as usize;
        self.attributes
            .get(index)
            .map(|attribute| attribute.aggregation_data_type)
    }

    pub fn pivot_count(&self) -> NonZeroU32 {
        self.pivot_count
    }

    pub fn non_pivot_count(&self) -> NonZeroU32 {
        self.non_pivot_count
    }

    /// Byte width of one record holding every attribute value.
    pub fn record_size_bytes(&self) -> u64 {
        self.attributes
            .iter()
            .map(|attribute| u64::from(attribute.aggregation_data_type.width_bytes()))
            .sum()
    }

    pub fn into_parts(self) -> (Vec<Metric>, Vec<WtAttribute>) {
        (self.metrics, self.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_emits_42_attributes() {
        let catalog = AttributeCatalog::build(&WorkloadPlan::default()).expect("catalog");

        assert_eq!(catalog.metrics().len(), 9);
        assert_eq!(catalog.attributes().len(), 42);
        assert_eq!(catalog.pivot_count().get(), 20);
        assert_eq!(catalog.non_pivot_count().get(), 22);
    }

    #[test]
    fn pivot_flag_partitions_ids() {
        let catalog = AttributeCatalog::build(&WorkloadPlan::default()).expect("catalog");

        for attribute in catalog.attributes() {
            assert_eq!(attribute.is_pivot, attribute.id <= 20, "id {}", attribute.id);
        }
    }

    #[test]
    fn emission_order_matches_catalog_layout() {
        let catalog = AttributeCatalog::build(&WorkloadPlan::default()).expect("catalog");
        let attributes = catalog.attributes();

        // daily window, all calls: cost x3, duration x3, call count
        let head: Vec<(u32, AggregationFn)> = attributes[..7]
            .iter()
            .map(|attribute| (attribute.metric_id, attribute.aggregation_fn))
            .collect();
        assert_eq!(
            head,
            vec![
                (1, AggregationFn::Sum),
                (1, AggregationFn::Min),
                (1, AggregationFn::Max),
                (3, AggregationFn::Sum),
                (3, AggregationFn::Min),
                (3, AggregationFn::Max),
                (2, AggregationFn::Sum),
            ]
        );
        assert_eq!(attributes[7].metric_id, 4);
        assert_eq!(attributes[20].window_size, WindowSize::Day);
        assert_eq!(attributes[21].window_size, WindowSize::Week);
        assert_eq!(attributes[21].metric_id, 1);
    }

    #[test]
    fn aggregation_types_follow_metric_types() {
        let catalog = AttributeCatalog::build(&WorkloadPlan::default()).expect("catalog");

        assert_eq!(catalog.aggregation_data_type(1), Some(DataType::Double));
        assert_eq!(catalog.aggregation_data_type(4), Some(DataType::Uint));
        assert_eq!(catalog.aggregation_data_type(7), Some(DataType::Uint));
        assert_eq!(catalog.aggregation_data_type(0), None);
        assert_eq!(catalog.aggregation_data_type(43), None);
    }

    #[test]
    fn record_size_counts_value_widths() {
        let catalog = AttributeCatalog::build(&WorkloadPlan::default()).expect("catalog");
        assert_eq!(catalog.record_size_bytes(), 240);
    }

    #[test]
    fn repetitions_multiply_the_catalog() {
        let mut plan = WorkloadPlan::default();
        plan.attributes.repetitions = 3;

        let catalog = AttributeCatalog::build(&plan).expect("catalog");
        assert_eq!(catalog.attributes().len(), 126);
        assert_eq!(catalog.attributes().len() as u64, plan.wt_attribute_count());
    }

    #[test]
    fn rejects_catalog_without_non_pivot_attributes() {
        let mut plan = WorkloadPlan::default();
        plan.attributes.pivot_attributes = 42;

        let err = AttributeCatalog::build(&plan).expect_err("no non-pivot attributes");
        assert!(matches!(err, GenerationError::InvalidPlan(_)));
    }
}
