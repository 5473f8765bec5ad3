// SPDX-License-Identifier: Apache-2.0

use millcert_ingest::{aggregate, chemical_columns, physical_columns};
use millcert_model::{decode_records, RawParameterRecord};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn row_strategy() -> impl Strategy<Value = RawParameterRecord> {
    (
        prop_oneof![Just("H1"), Just("H2"), Just("H3")],
        prop_oneof![
            Just("ChemicalComposition"),
            Just("PhysicalProperty"),
            Just("ImpactTest"),
            Just("Unknown"),
        ],
        prop_oneof![Just("C"), Just("Mn"), Just("Si"), Just("Yield"), Just("Tensile")],
        proptest::option::of("[0-9]\\.[0-9]{1,2}|  "),
        proptest::option::of(-60_i32..=20_i32),
        proptest::option::of(prop_oneof![Just("10x10"), Just("10x5")]),
    )
        .prop_map(|(lot, parm_type, name, value, temperature, size)| RawParameterRecord {
            lot_id: lot.to_string(),
            parm_type: Some(parm_type.to_string()),
            parm_name: Some(name.to_string()),
            value_text: value,
            impact_temperature: temperature.map(f64::from),
            impact_size: size.map(ToString::to_string),
            impact_value1: Some("30".to_string()),
            ..RawParameterRecord::default()
        })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn aggregation_and_column_resolution_are_idempotent(
        rows in proptest::collection::vec(row_strategy(), 0..40)
    ) {
        let records = decode_records(rows);
        let first = aggregate(&records);
        let second = aggregate(&records);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(chemical_columns(first.values()), chemical_columns(second.values()));
        prop_assert_eq!(physical_columns(first.values()), physical_columns(second.values()));
    }

    #[test]
    fn names_are_unique_and_impact_is_never_empty(
        rows in proptest::collection::vec(row_strategy(), 1..40)
    ) {
        let lots = aggregate(&decode_records(rows));
        for lot in lots.values() {
            let mut elements: Vec<_> = lot.chemical_composition.iter().map(|e| &e.element).collect();
            let before = elements.len();
            elements.sort();
            elements.dedup();
            prop_assert_eq!(before, elements.len());

            let mut keys: Vec<_> = lot.impact_tests.iter().map(|t| t.dedup_key()).collect();
            let before = keys.len();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(before, keys.len());
            prop_assert!(!lot.impact_tests.is_empty());
        }
    }
}
