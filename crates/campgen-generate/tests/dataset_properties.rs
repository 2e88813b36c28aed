use std::collections::{BTreeMap, HashSet};

use campgen_core::{DataType, Dataset, validate_dataset};
use campgen_generate::GenerationEngine;
use campgen_generate::campaign::{DAY_MILLIS, EPOCH_MILLIS};
use campgen_plan::WorkloadPlan;

fn canonical_dataset() -> Dataset {
    GenerationEngine::default()
        .generate(&WorkloadPlan::default())
        .expect("generate canonical workload")
        .dataset
}

#[test]
fn canonical_run_passes_dataset_validation() {
    let dataset = canonical_dataset();
    validate_dataset(&dataset).expect("valid dataset");
    assert_eq!(dataset.metrics.len(), 9);
    assert_eq!(dataset.wt_attributes.len(), 42);
    assert_eq!(dataset.campaigns.len(), 300);
}

#[test]
fn pivot_flag_covers_first_twenty_attributes() {
    let dataset = canonical_dataset();
    let pivots: Vec<u32> = dataset
        .wt_attributes
        .iter()
        .filter(|attribute| attribute.is_pivot)
        .map(|attribute| attribute.id)
        .collect();
    assert_eq!(pivots, (1..=20).collect::<Vec<_>>());
}

#[test]
fn pools_never_hold_duplicates() {
    let dataset = canonical_dataset();

    let constants: HashSet<(DataType, &str)> = dataset
        .constants
        .iter()
        .map(|constant| (constant.data_type, constant.value.as_str()))
        .collect();
    assert_eq!(constants.len(), dataset.constants.len());

    let predicates: HashSet<_> = dataset
        .predicates
        .iter()
        .map(|predicate| (predicate.wt_attribute_id, predicate.operator, predicate.constant_id))
        .collect();
    assert_eq!(predicates.len(), dataset.predicates.len());
}

#[test]
fn constant_values_stay_in_range() {
    let dataset = canonical_dataset();
    for constant in &dataset.constants {
        let value: f64 = constant.value.parse().expect("numeric constant");
        assert!((11.0..110.0).contains(&value), "constant {}", constant.value);
        assert_eq!(
            constant.value.contains('.'),
            constant.data_type == DataType::Double
        );
    }
}

#[test]
fn campaign_shape_stays_within_limits() {
    let dataset = canonical_dataset();

    let mut per_campaign: BTreeMap<u32, usize> = BTreeMap::new();
    for conjunct in &dataset.conjuncts {
        *per_campaign.entry(conjunct.campaign_id).or_default() += 1;
    }
    assert_eq!(per_campaign.len(), dataset.campaigns.len());
    assert!(per_campaign.values().all(|count| (1..=5).contains(count)));

    for conjunct in &dataset.conjuncts {
        let predicates = dataset.predicate_ids_of(conjunct.id).len();
        assert!((1..=5).contains(&predicates), "conjunct {}", conjunct.id);
    }

    for campaign in &dataset.campaigns {
        let days = (campaign.valid_to - campaign.valid_from) / DAY_MILLIS;
        assert!((7..=31).contains(&days));
        assert!(campaign.valid_from >= EPOCH_MILLIS);
    }
}

#[test]
fn most_conjuncts_are_anchored_on_a_pivot() {
    let dataset = canonical_dataset();
    let anchored = dataset
        .conjuncts
        .iter()
        .filter(|conjunct| {
            dataset.predicate_ids_of(conjunct.id).iter().any(|id| {
                let predicate = &dataset.predicates[*id as usize - 1];
                predicate.wt_attribute_id <= 20
            })
        })
        .count();

    let share = anchored as f64 / dataset.conjuncts.len() as f64;
    assert!(share > 0.8, "pivot share {share}");
}
