// SPDX-License-Identifier: Apache-2.0

use millcert_model::{
    CertificateDocument, CertificateInput, ItemLine, LotId, LotLookup, ReferencedLots,
};
use tracing::debug;

/// Distinct non-blank heat numbers referenced by `items`, in first-seen order.
#[must_use]
pub fn referenced_heat_numbers(items: &[ItemLine]) -> Vec<LotId> {
    let mut out: Vec<LotId> = Vec::new();
    for lot_id in items.iter().filter_map(ItemLine::lot_id) {
        if !out.contains(&lot_id) {
            out.push(lot_id);
        }
    }
    out
}

/// Merges certificate input with the lots its items reference.
///
/// Heat numbers without a known lot are left out; that is not an error.
/// The result holds owned snapshots, so later changes behind `lots` do not
/// affect it.
#[must_use]
pub fn assemble<L: LotLookup>(input: CertificateInput, lots: &L) -> CertificateDocument {
    let mut referenced = ReferencedLots::default();
    for lot_id in referenced_heat_numbers(&input.items) {
        match lots.lot(&lot_id) {
            Some(lot) => referenced.insert(lot),
            None => debug!(lot_id = %lot_id, "referenced heat number has no lab data"),
        }
    }
    CertificateDocument {
        header: input.header,
        items: input.items,
        heat_tests: input.heat_tests,
        other_tests: input.other_tests,
        remarks: input.remarks,
        lots_by_item_heat_no: referenced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millcert_model::{LabMetadata, LotAggregate};
    use std::collections::BTreeMap;

    fn item(heat_no: &str) -> ItemLine {
        ItemLine {
            heat_no: Some(heat_no.to_string()),
            ..ItemLine::default()
        }
    }

    #[test]
    fn heat_numbers_are_distinct_and_ordered() {
        let items = vec![item("H2"), item(" "), item("H1"), item("H2 ")];
        let ids: Vec<_> = referenced_heat_numbers(&items)
            .iter()
            .map(|l| l.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["H2", "H1"]);
    }

    #[test]
    fn assembled_document_is_a_snapshot() {
        let h1 = LotId::parse("H1").expect("lot");
        let mut known = BTreeMap::new();
        known.insert(h1.clone(), LotAggregate::new(h1.clone(), &LabMetadata::default()));
        let doc = assemble(
            CertificateInput {
                items: vec![item("H1")],
                ..CertificateInput::default()
            },
            &known,
        );
        known.clear();
        assert!(doc.lots_by_item_heat_no.contains_key(&h1));
    }
}
