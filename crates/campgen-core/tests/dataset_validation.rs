use campgen_core::{
    AggregationFn, Campaign, Conjunct, ConjunctPredicate, Constant, DataType, Dataset, Error,
    DAY_MILLIS, EPOCH_MILLIS, FiringInterval, FiringStartCondition, Metric, Operator, Predicate,
    WindowSize, WindowType, WtAttribute, validate_dataset,
};

fn dataset_fixture() -> Dataset {
    Dataset {
        metrics: vec![
            Metric {
                id: 1,
                name: "cost".to_string(),
                data_type: DataType::Double,
            },
            Metric {
                id: 2,
                name: "call".to_string(),
                data_type: DataType::Uint,
            },
        ],
        wt_attributes: vec![
            WtAttribute {
                id: 1,
                metric_id: 1,
                is_pivot: true,
                window_type: WindowType::Tumbling,
                window_size: WindowSize::Day,
                aggregation_fn: AggregationFn::Sum,
                aggregation_data_type: DataType::Double,
            },
            WtAttribute {
                id: 2,
                metric_id: 2,
                is_pivot: false,
                window_type: WindowType::Tumbling,
                window_size: WindowSize::Day,
                aggregation_fn: AggregationFn::Sum,
                aggregation_data_type: DataType::Uint,
            },
        ],
        constants: vec![
            Constant {
                id: 1,
                value: "42.0".to_string(),
                data_type: DataType::Double,
            },
            Constant {
                id: 2,
                value: "42".to_string(),
                data_type: DataType::Uint,
            },
        ],
        predicates: vec![
            Predicate {
                id: 1,
                wt_attribute_id: 1,
                operator: Operator::Gr,
                constant_id: 1,
            },
            Predicate {
                id: 2,
                wt_attribute_id: 2,
                operator: Operator::Lte,
                constant_id: 2,
            },
        ],
        campaigns: vec![Campaign {
            id: 1,
            valid_from: 1_325_376_000_000,
            valid_to: 1_325_980_800_000,
            firing_interval: FiringInterval::Weekly,
            firing_start_condition: FiringStartCondition::Fixed,
        }],
        conjuncts: vec![Conjunct {
            id: 1,
            campaign_id: 1,
        }],
        conjunct_predicates: vec![
            ConjunctPredicate {
                predicate_id: 1,
                conjunct_id: 1,
            },
            ConjunctPredicate {
                predicate_id: 2,
                conjunct_id: 1,
            },
        ],
    }
}

#[test]
fn accepts_consistent_dataset() {
    validate_dataset(&dataset_fixture()).expect("fixture is consistent");
}

#[test]
fn rejects_duplicate_predicate_triples() {
    let mut dataset = dataset_fixture();
    dataset.predicates[1] = Predicate {
        id: 2,
        wt_attribute_id: 1,
        operator: Operator::Gr,
        constant_id: 1,
    };

    let err = validate_dataset(&dataset).expect_err("duplicate predicate");
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("duplicates")));
}

#[test]
fn rejects_constant_type_mismatch() {
    let mut dataset = dataset_fixture();
    dataset.predicates[0].constant_id = 2;

    let err = validate_dataset(&dataset).expect_err("type mismatch");
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("compares")));
}

#[test]
fn rejects_dangling_conjunct_reference() {
    let mut dataset = dataset_fixture();
    dataset.conjuncts[0].campaign_id = 7;

    assert!(validate_dataset(&dataset).is_err());
}

#[test]
fn rejects_gaps_in_ids() {
    let mut dataset = dataset_fixture();
    dataset.constants[1].id = 3;
    dataset.predicates[1].constant_id = 3;

    let err = validate_dataset(&dataset).expect_err("sparse ids");
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("constant id 3")));
}

#[test]
fn accepts_window_bounds() {
    let mut dataset = dataset_fixture();
    dataset.campaigns[0].valid_from = EPOCH_MILLIS;
    dataset.campaigns[0].valid_to = EPOCH_MILLIS + 31 * DAY_MILLIS;
    validate_dataset(&dataset).expect("full month window");

    dataset.campaigns[0].valid_from = EPOCH_MILLIS + 24 * DAY_MILLIS;
    validate_dataset(&dataset).expect("week ending on the last day");
}

#[test]
fn rejects_windows_outside_duration_range() {
    for days in [0, 3, 6, 32, 40] {
        let mut dataset = dataset_fixture();
        dataset.campaigns[0].valid_from = EPOCH_MILLIS;
        dataset.campaigns[0].valid_to = EPOCH_MILLIS + days * DAY_MILLIS;

        let err = validate_dataset(&dataset).expect_err("window length");
        assert!(
            matches!(&err, Error::InvalidDataset(message) if message.contains("campaign 1")),
            "{days} days: {err}"
        );
    }
}

#[test]
fn rejects_windows_outside_generation_epoch() {
    let mut dataset = dataset_fixture();
    dataset.campaigns[0].valid_from = EPOCH_MILLIS - DAY_MILLIS;
    dataset.campaigns[0].valid_to = EPOCH_MILLIS + 7 * DAY_MILLIS;
    let err = validate_dataset(&dataset).expect_err("starts before 2012");
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("epoch")));

    let mut dataset = dataset_fixture();
    dataset.campaigns[0].valid_from = EPOCH_MILLIS + 30 * DAY_MILLIS;
    dataset.campaigns[0].valid_to = EPOCH_MILLIS + 40 * DAY_MILLIS;
    let err = validate_dataset(&dataset).expect_err("ends after the first month");
    assert!(matches!(err, Error::InvalidDataset(message) if message.contains("epoch")));
}

#[test]
fn serializes_vocabularies_with_stored_spelling() {
    let json = serde_json::to_string(&dataset_fixture().campaigns[0]).expect("serialize");
    assert_eq!(
        json,
        r#"{"id":1,"valid_from":1325376000000,"valid_to":1325980800000,"firing_interval":"w","firing_start_condition":"fixed"}"#
    );
}
