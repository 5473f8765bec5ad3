// SPDX-License-Identifier: Apache-2.0

use millcert_model::{
    ChemicalEntry, ImpactReading, ImpactTest, LotAggregate, LotId, ParameterPayload,
    ParameterRecord, PhysicalEntry,
};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Folds flat parameter rows into one aggregate per lot.
///
/// Rows are folded in input order within each lot, so "first occurrence wins"
/// refers to the caller's ordering. Never fails: rows the folder cannot use
/// contribute lab metadata at most.
#[must_use]
pub fn aggregate(records: &[ParameterRecord]) -> BTreeMap<LotId, LotAggregate> {
    let mut folders: BTreeMap<LotId, LotFolder> = BTreeMap::new();
    for record in records {
        folders
            .entry(record.lot_id.clone())
            .or_insert_with(|| LotFolder::new(record))
            .fold(record);
    }
    folders
        .into_iter()
        .map(|(lot_id, folder)| (lot_id, folder.finish()))
        .collect()
}

/// Aggregate for a single lot, e.g. for an edit view. `None` when the lot
/// has no rows.
#[must_use]
pub fn aggregate_lot(records: &[ParameterRecord], lot_id: &LotId) -> Option<LotAggregate> {
    let mut matching = records.iter().filter(|r| &r.lot_id == lot_id);
    let first = matching.next()?;
    let mut folder = LotFolder::new(first);
    folder.fold(first);
    for record in matching {
        folder.fold(record);
    }
    Some(folder.finish())
}

struct LotFolder {
    lot: LotAggregate,
    seen_elements: HashSet<String>,
    seen_properties: HashSet<String>,
    seen_impact_keys: HashSet<(String, String)>,
}

impl LotFolder {
    fn new(first: &ParameterRecord) -> Self {
        Self {
            lot: LotAggregate::new(first.lot_id.clone(), &first.lab),
            seen_elements: HashSet::new(),
            seen_properties: HashSet::new(),
            seen_impact_keys: HashSet::new(),
        }
    }

    fn fold(&mut self, record: &ParameterRecord) {
        match &record.payload {
            ParameterPayload::Chemical {
                element: Some(element),
                value,
            } => {
                if self.seen_elements.insert(element.clone()) {
                    self.lot.chemical_composition.push(ChemicalEntry {
                        element: element.clone(),
                        value: value.display(),
                    });
                } else {
                    debug!(lot = %self.lot.lot_id, element = %element, "duplicate chemical entry dropped");
                }
            }
            ParameterPayload::Physical {
                property: Some(property),
                value,
            } => {
                if self.seen_properties.insert(property.clone()) {
                    self.lot.physical_properties.push(PhysicalEntry {
                        property: property.clone(),
                        value: value.display(),
                    });
                } else {
                    debug!(lot = %self.lot.lot_id, property = %property, "duplicate physical entry dropped");
                }
            }
            ParameterPayload::Chemical { element: None, .. }
            | ParameterPayload::Physical { property: None, .. } => {
                debug!(lot = %self.lot.lot_id, "unnamed parameter row ignored");
            }
            ParameterPayload::Impact(reading) => self.fold_impact(reading),
            ParameterPayload::Unrecognized { parm_type } => {
                debug!(
                    lot = %self.lot.lot_id,
                    parm_type = parm_type.as_deref().unwrap_or(""),
                    "unrecognized parameter type ignored"
                );
            }
        }
    }

    fn fold_impact(&mut self, reading: &ImpactReading) {
        if reading.is_empty() {
            return;
        }
        let entry = ImpactTest {
            temperature: reading.temperature,
            size: reading.size.clone(),
            value1: reading.value1.clone(),
            value2: reading.value2.clone(),
            value3: reading.value3.clone(),
            average: reading.average.clone(),
        };
        if self.seen_impact_keys.insert(entry.dedup_key()) {
            self.lot.impact_tests.push(entry);
        } else {
            debug!(lot = %self.lot.lot_id, key = ?entry.dedup_key(), "duplicate impact entry dropped");
        }
    }

    fn finish(mut self) -> LotAggregate {
        if self.lot.impact_tests.is_empty() {
            self.lot.impact_tests.push(ImpactTest::default());
        }
        self.lot
    }
}
