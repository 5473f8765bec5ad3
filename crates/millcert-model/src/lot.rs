// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use millcert_core::text::{format_number, or_empty};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{LabMetadata, LotId};

/// Substituted for a missing impact temperature or size when keying entries.
pub const IMPACT_KEY_SENTINEL: &str = "N/A";

/// A `{name, value}` pair that can become a column of a lot matrix.
pub trait NamedValue {
    fn name(&self) -> &str;
    fn value(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChemicalEntry {
    pub element: String,
    pub value: Option<String>,
}

impl NamedValue for ChemicalEntry {
    fn name(&self) -> &str {
        &self.element
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalEntry {
    pub property: String,
    pub value: Option<String>,
}

impl NamedValue for PhysicalEntry {
    fn name(&self) -> &str {
        &self.property
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpactTest {
    pub temperature: Option<f64>,
    pub size: Option<String>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub value3: Option<String>,
    pub average: Option<String>,
}

impl ImpactTest {
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        let temperature = self
            .temperature
            .and_then(format_number)
            .unwrap_or_else(|| IMPACT_KEY_SENTINEL.to_string());
        let size = self
            .size
            .clone()
            .unwrap_or_else(|| IMPACT_KEY_SENTINEL.to_string());
        (temperature, size)
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotAggregate {
    pub lot_id: LotId,
    pub lab_name: String,
    pub lab_report_no: String,
    pub lab_report_date: Option<NaiveDate>,
    pub chemical_composition: Vec<ChemicalEntry>,
    pub physical_properties: Vec<PhysicalEntry>,
    pub impact_tests: Vec<ImpactTest>,
}

impl LotAggregate {
    /// Empty aggregate carrying the lab metadata of the lot's first record.
    #[must_use]
    pub fn new(lot_id: LotId, lab: &LabMetadata) -> Self {
        Self {
            lot_id,
            lab_name: or_empty(lab.lab_name.as_deref()),
            lab_report_no: or_empty(lab.lab_report_no.as_deref()),
            lab_report_date: lab.lab_report_date,
            chemical_composition: Vec::new(),
            physical_properties: Vec::new(),
            impact_tests: Vec::new(),
        }
    }
}

/// Read access to known lots, injected into certificate assembly.
pub trait LotLookup {
    /// Returns an owned snapshot of the lot, if known.
    fn lot(&self, lot_id: &LotId) -> Option<LotAggregate>;
}

impl LotLookup for BTreeMap<LotId, LotAggregate> {
    fn lot(&self, lot_id: &LotId) -> Option<LotAggregate> {
        self.get(lot_id).cloned()
    }
}

impl<T: LotLookup + ?Sized> LotLookup for &T {
    fn lot(&self, lot_id: &LotId) -> Option<LotAggregate> {
        (**self).lot(lot_id)
    }
}
