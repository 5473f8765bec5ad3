// SPDX-License-Identifier: Apache-2.0

use millcert_core::text::non_blank;
use millcert_model::{ChemicalEntry, LotAggregate, LotId, NamedValue, PhysicalEntry};
use serde::Serialize;
use std::collections::HashSet;

/// Ordered column universe over a group of lots.
///
/// Names keep first-seen order across `lots` and are dropped only when no
/// lot has a non-blank value for them.
#[must_use]
pub fn resolve_columns<'a, I, T, F>(lots: I, selector: F) -> Vec<String>
where
    I: IntoIterator<Item = &'a LotAggregate>,
    T: NamedValue + 'a,
    F: Fn(&'a LotAggregate) -> &'a [T],
{
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut populated: HashSet<&str> = HashSet::new();
    for lot in lots {
        for entry in selector(lot) {
            let name = entry.name();
            if seen.insert(name) {
                order.push(name.to_string());
            }
            if non_blank(entry.value()).is_some() {
                populated.insert(name);
            }
        }
    }
    order.retain(|name| populated.contains(name.as_str()));
    order
}

#[must_use]
pub fn chemical_columns<'a, I>(lots: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LotAggregate>,
{
    resolve_columns(lots, chemical_entries)
}

#[must_use]
pub fn physical_columns<'a, I>(lots: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LotAggregate>,
{
    resolve_columns(lots, physical_entries)
}

#[must_use]
pub fn chemical_entries(lot: &LotAggregate) -> &[ChemicalEntry] {
    &lot.chemical_composition
}

#[must_use]
pub fn physical_entries(lot: &LotAggregate) -> &[PhysicalEntry] {
    &lot.physical_properties
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub lot_id: LotId,
    /// One cell per column; `None` where the lot has no non-blank value.
    pub cells: Vec<Option<String>>,
}

/// Sparse lot × parameter matrix used for the composition and property tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl ParameterMatrix {
    #[must_use]
    pub fn build<'a, T, F>(lots: &[&'a LotAggregate], selector: F) -> Self
    where
        T: NamedValue + 'a,
        F: Fn(&'a LotAggregate) -> &'a [T] + Copy,
    {
        let columns = resolve_columns(lots.iter().copied(), selector);
        let rows = lots
            .iter()
            .map(|lot| {
                let entries = selector(*lot);
                let cells = columns
                    .iter()
                    .map(|column| {
                        entries
                            .iter()
                            .find(|entry| entry.name() == column.as_str())
                            .and_then(|entry| non_blank(entry.value()))
                            .map(|v| v.trim().to_string())
                    })
                    .collect();
                MatrixRow {
                    lot_id: lot.lot_id.clone(),
                    cells,
                }
            })
            .collect();
        Self { columns, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millcert_model::LabMetadata;

    fn lot_with(id: &str, entries: &[(&str, Option<&str>)]) -> LotAggregate {
        let mut lot = LotAggregate::new(LotId::parse(id).expect("lot"), &LabMetadata::default());
        lot.chemical_composition = entries
            .iter()
            .map(|(element, value)| ChemicalEntry {
                element: (*element).to_string(),
                value: value.map(ToString::to_string),
            })
            .collect();
        lot
    }

    #[test]
    fn columns_follow_first_seen_order_not_lexical() {
        let a = lot_with("A", &[("Si", Some("0.2")), ("C", Some("0.1"))]);
        let b = lot_with("B", &[("Mn", Some("1.0")), ("C", Some("0.2"))]);
        assert_eq!(chemical_columns([&a, &b]), vec!["Si", "C", "Mn"]);
    }

    #[test]
    fn blank_everywhere_columns_are_dropped() {
        let a = lot_with("A", &[("C", Some("  ")), ("P", Some("0.01"))]);
        let b = lot_with("B", &[("C", None)]);
        assert_eq!(chemical_columns([&a, &b]), vec!["P"]);
    }

    #[test]
    fn matrix_marks_missing_cells_as_none() {
        let a = lot_with("A", &[("C", Some("0.2"))]);
        let b = lot_with("B", &[("C", None), ("Mn", Some("1.1"))]);
        let matrix = ParameterMatrix::build(&[&a, &b], chemical_entries);
        assert_eq!(matrix.columns, vec!["C", "Mn"]);
        assert_eq!(
            matrix.rows[0].cells,
            vec![Some("0.2".to_string()), None]
        );
        assert_eq!(
            matrix.rows[1].cells,
            vec![None, Some("1.1".to_string())]
        );
    }

    #[test]
    fn empty_input_yields_no_columns() {
        let none: Vec<&LotAggregate> = Vec::new();
        assert!(physical_columns(none).is_empty());
    }
}
