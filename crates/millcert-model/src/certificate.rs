// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::lot::LotAggregate;
use crate::record::LotId;
use crate::serde_helpers::{lenient_date, lenient_f64, lenient_string, lenient_u32};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateHeader {
    /// External document number; names the output artifact.
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub document_number: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub certificate_no: Option<String>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub certificate_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub customer_name: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub customer_address: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub po_number: Option<String>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub po_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub start_material: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub size: Option<String>,
    /// Branch/company selector; picks the footer company name.
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLine {
    #[serde(deserialize_with = "lenient_u32::deserialize")]
    pub sequence_no: Option<u32>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub product: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub specification: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub dimension_standard: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub size: Option<String>,
    #[serde(alias = "lot_no", deserialize_with = "lenient_string::deserialize")]
    pub heat_no: Option<String>,
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub unit: Option<String>,
}

impl ItemLine {
    #[must_use]
    pub fn lot_id(&self) -> Option<LotId> {
        self.heat_no.as_deref().and_then(LotId::parse)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatTest {
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherTest {
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Remark {
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub text: Option<String>,
}

/// Certificate as entered on the certificate screen, before lot data is merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateInput {
    pub header: CertificateHeader,
    pub items: Vec<ItemLine>,
    pub heat_tests: Vec<HeatTest>,
    pub other_tests: Vec<OtherTest>,
    pub remarks: Vec<Remark>,
}

/// Lots keyed by heat number, iterated in item first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferencedLots {
    order: Vec<LotId>,
    lots: BTreeMap<LotId, LotAggregate>,
}

impl ReferencedLots {
    /// Keeps the first aggregate inserted for a lot id.
    pub fn insert(&mut self, lot: LotAggregate) {
        if self.lots.contains_key(&lot.lot_id) {
            return;
        }
        self.order.push(lot.lot_id.clone());
        self.lots.insert(lot.lot_id.clone(), lot);
    }

    #[must_use]
    pub fn get(&self, lot_id: &LotId) -> Option<&LotAggregate> {
        self.lots.get(lot_id)
    }

    #[must_use]
    pub fn contains_key(&self, lot_id: &LotId) -> bool {
        self.lots.contains_key(lot_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LotId> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotAggregate> {
        self.order.iter().filter_map(|id| self.lots.get(id))
    }
}

/// Render-ready certificate. Built once by assembly; lot data is a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateDocument {
    pub header: CertificateHeader,
    pub items: Vec<ItemLine>,
    pub heat_tests: Vec<HeatTest>,
    pub other_tests: Vec<OtherTest>,
    pub remarks: Vec<Remark>,
    pub lots_by_item_heat_no: ReferencedLots,
}
