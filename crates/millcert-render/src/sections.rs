// SPDX-License-Identifier: Apache-2.0

//! Layout IR: what goes on the certificate, independent of where it lands.

use crate::config::RenderConfig;
use millcert_core::text::{
    format_number, format_optional_date, non_blank, or_placeholder, PLACEHOLDER,
};
use millcert_ingest::{chemical_entries, physical_entries, ParameterMatrix};
use millcert_model::{CertificateDocument, ItemLine, LotAggregate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Full,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Title,
    Header,
    Items,
    ChemicalComposition,
    PhysicalProperties,
    OtherTests,
    Remarks,
    LabDetails,
    ImpactTests,
    HeatTests,
    Footer,
}

impl SectionKind {
    /// Sections repeated on every page, including continuation pages.
    #[must_use]
    pub const fn is_page_furniture(self) -> bool {
        matches!(self, Self::Title | Self::Header | Self::Footer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Title,
    Subtitle,
    Body,
    Strong,
}

/// One row of free text with optional left, centred and right slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextLine {
    pub left: String,
    pub center: String,
    pub right: String,
    pub style: Option<TextStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub label: String,
    /// Relative width; normalised over the table at layout time.
    pub weight: f32,
}

impl Column {
    fn new(label: &str, weight: f32) -> Self {
        Self {
            label: label.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Text {
        lines: Vec<TextLine>,
    },
    KeyValue {
        rows: Vec<Vec<(String, String)>>,
    },
    Table {
        title: Option<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    },
    List {
        title: Option<String>,
        lines: Vec<String>,
    },
}

impl Block {
    /// Body rows of a table; empty for other blocks.
    #[must_use]
    pub fn table_rows(&self) -> &[Vec<String>] {
        match self {
            Self::Table { rows, .. } => rows,
            _ => &[],
        }
    }

    #[must_use]
    pub fn list_lines(&self) -> &[String] {
        match self {
            Self::List { lines, .. } => lines,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub region: Region,
    pub block: Block,
}

impl Section {
    fn new(kind: SectionKind, region: Region, block: Block) -> Self {
        Self {
            kind,
            region,
            block,
        }
    }
}

/// Finds the first section of a kind.
#[must_use]
pub fn section(sections: &[Section], kind: SectionKind) -> Option<&Section> {
    sections.iter().find(|s| s.kind == kind)
}

/// Builds the certificate's sections in stacking order.
///
/// Full-width sections come first, then the left region (composition,
/// properties, other tests, remarks), then the right region (laboratory,
/// impact, heat treatment), then the footer.
#[must_use]
pub fn build_sections(doc: &CertificateDocument, config: &RenderConfig) -> Vec<Section> {
    let lots: Vec<&LotAggregate> = doc.lots_by_item_heat_no.iter().collect();
    vec![
        title_section(config),
        header_section(doc),
        items_section(&doc.items, config.item_rows),
        matrix_section(
            SectionKind::ChemicalComposition,
            "CHEMICAL COMPOSITION (%)",
            &ParameterMatrix::build(&lots, chemical_entries),
        ),
        matrix_section(
            SectionKind::PhysicalProperties,
            "PHYSICAL PROPERTIES",
            &ParameterMatrix::build(&lots, physical_entries),
        ),
        list_section(
            SectionKind::OtherTests,
            Region::Left,
            "OTHER TESTS",
            doc.other_tests
                .iter()
                .enumerate()
                .map(|(i, test)| {
                    format!(
                        "{}. {} : {}",
                        i + 1,
                        or_placeholder(test.description.as_deref()),
                        or_placeholder(test.result.as_deref())
                    )
                })
                .collect(),
        ),
        list_section(
            SectionKind::Remarks,
            Region::Left,
            "REMARKS",
            doc.remarks
                .iter()
                .enumerate()
                .map(|(i, remark)| {
                    format!("{}. {}", i + 1, or_placeholder(remark.text.as_deref()))
                })
                .collect(),
        ),
        lab_section(&lots),
        impact_section(&lots),
        list_section(
            SectionKind::HeatTests,
            Region::Right,
            "HEAT TREATMENT",
            doc.heat_tests
                .iter()
                .map(|test| or_placeholder(test.description.as_deref()))
                .collect(),
        ),
        footer_section(doc, config),
    ]
}

fn title_section(config: &RenderConfig) -> Section {
    Section::new(
        SectionKind::Title,
        Region::Full,
        Block::Text {
            lines: vec![
                TextLine {
                    center: config.title.clone(),
                    style: Some(TextStyle::Title),
                    ..TextLine::default()
                },
                TextLine {
                    center: config.subtitle.clone(),
                    style: Some(TextStyle::Subtitle),
                    ..TextLine::default()
                },
            ],
        },
    )
}

fn pair(key: &str, value: String) -> (String, String) {
    (key.to_string(), value)
}

fn header_section(doc: &CertificateDocument) -> Section {
    let h = &doc.header;
    Section::new(
        SectionKind::Header,
        Region::Full,
        Block::KeyValue {
            rows: vec![
                vec![
                    pair("Customer", or_placeholder(h.customer_name.as_deref())),
                    pair("Certificate No.", or_placeholder(h.certificate_no.as_deref())),
                    pair("Date", format_optional_date(h.certificate_date)),
                ],
                vec![
                    pair("Address", or_placeholder(h.customer_address.as_deref())),
                    pair("PO No.", or_placeholder(h.po_number.as_deref())),
                    pair("PO Date", format_optional_date(h.po_date)),
                ],
                vec![
                    pair("Start Material", or_placeholder(h.start_material.as_deref())),
                    pair("Size", or_placeholder(h.size.as_deref())),
                    pair("Doc No.", or_placeholder(h.document_number.as_deref())),
                ],
            ],
        },
    )
}

fn item_row(position: usize, item: &ItemLine) -> Vec<String> {
    let sequence = item
        .sequence_no
        .map_or_else(|| (position + 1).to_string(), |n| n.to_string());
    vec![
        sequence,
        or_placeholder(item.product.as_deref()),
        or_placeholder(item.specification.as_deref()),
        or_placeholder(item.dimension_standard.as_deref()),
        or_placeholder(item.size.as_deref()),
        or_placeholder(item.heat_no.as_deref()),
        item.quantity
            .and_then(format_number)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        or_placeholder(item.unit.as_deref()),
    ]
}

/// Exactly `slots` rows: items beyond the slot count are cut, missing ones
/// are padded with fully blank rows.
fn items_section(items: &[ItemLine], slots: usize) -> Section {
    let columns = vec![
        Column::new("Sr.", 0.5),
        Column::new("Product", 2.5),
        Column::new("Specification", 2.0),
        Column::new("Dim. Std.", 1.5),
        Column::new("Size", 1.5),
        Column::new("Heat No.", 1.2),
        Column::new("Qty", 0.8),
        Column::new("Unit", 0.7),
    ];
    let width = columns.len();
    let mut rows: Vec<Vec<String>> = items
        .iter()
        .take(slots)
        .enumerate()
        .map(|(i, item)| item_row(i, item))
        .collect();
    rows.resize_with(slots, || vec![String::new(); width]);
    Section::new(
        SectionKind::Items,
        Region::Full,
        Block::Table {
            title: None,
            columns,
            rows,
        },
    )
}

fn matrix_section(kind: SectionKind, title: &str, matrix: &ParameterMatrix) -> Section {
    let mut columns = vec![Column::new("Heat No.", 1.6)];
    columns.extend(matrix.columns.iter().map(|name| Column::new(name, 1.0)));
    let rows = matrix
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.lot_id.to_string()];
            cells.extend(
                row.cells
                    .iter()
                    .map(|cell| or_placeholder(cell.as_deref())),
            );
            cells
        })
        .collect();
    Section::new(
        kind,
        Region::Left,
        Block::Table {
            title: Some(title.to_string()),
            columns,
            rows,
        },
    )
}

fn lab_section(lots: &[&LotAggregate]) -> Section {
    let rows = lots
        .iter()
        .map(|lot| {
            vec![
                lot.lot_id.to_string(),
                or_placeholder(Some(lot.lab_name.as_str())),
                or_placeholder(Some(lot.lab_report_no.as_str())),
                format_optional_date(lot.lab_report_date),
            ]
        })
        .collect();
    Section::new(
        SectionKind::LabDetails,
        Region::Right,
        Block::Table {
            title: Some("LABORATORY DETAILS".to_string()),
            columns: vec![
                Column::new("Heat No.", 1.0),
                Column::new("Lab Name", 1.6),
                Column::new("Report No.", 1.0),
                Column::new("Report Date", 1.0),
            ],
            rows,
        },
    )
}

fn impact_section(lots: &[&LotAggregate]) -> Section {
    let rows = lots
        .iter()
        .flat_map(|lot| {
            lot.impact_tests.iter().map(move |test| {
                vec![
                    lot.lot_id.to_string(),
                    or_placeholder(test.size.as_deref()),
                    test.temperature
                        .and_then(format_number)
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                    or_placeholder(test.value1.as_deref()),
                    or_placeholder(test.value2.as_deref()),
                    or_placeholder(test.value3.as_deref()),
                    or_placeholder(test.average.as_deref()),
                ]
            })
        })
        .collect();
    Section::new(
        SectionKind::ImpactTests,
        Region::Right,
        Block::Table {
            title: Some("IMPACT TEST (J)".to_string()),
            columns: vec![
                Column::new("Heat No.", 1.2),
                Column::new("Size", 1.2),
                Column::new("Temp \u{b0}C", 1.0),
                Column::new("1", 0.7),
                Column::new("2", 0.7),
                Column::new("3", 0.7),
                Column::new("Avg", 0.8),
            ],
            rows,
        },
    )
}

/// An empty list still renders one placeholder line.
fn list_section(
    kind: SectionKind,
    region: Region,
    title: &str,
    mut lines: Vec<String>,
) -> Section {
    if lines.is_empty() {
        lines.push(PLACEHOLDER.to_string());
    }
    Section::new(
        kind,
        region,
        Block::List {
            title: Some(title.to_string()),
            lines,
        },
    )
}

fn footer_section(doc: &CertificateDocument, config: &RenderConfig) -> Section {
    let company = config.company_for_branch(non_blank(doc.header.branch.as_deref()));
    let company_line = if company.trim().is_empty() {
        String::new()
    } else {
        format!("For {}", company.trim())
    };
    Section::new(
        SectionKind::Footer,
        Region::Full,
        Block::Text {
            lines: vec![
                TextLine {
                    right: company_line,
                    style: Some(TextStyle::Strong),
                    ..TextLine::default()
                },
                TextLine::default(),
                TextLine {
                    left: config.checked_by_label.clone(),
                    right: config.signatory_label.clone(),
                    style: Some(TextStyle::Body),
                    ..TextLine::default()
                },
            ],
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use millcert_model::{CertificateHeader, ReferencedLots};

    fn empty_doc() -> CertificateDocument {
        CertificateDocument {
            header: CertificateHeader::default(),
            items: Vec::new(),
            heat_tests: Vec::new(),
            other_tests: Vec::new(),
            remarks: Vec::new(),
            lots_by_item_heat_no: ReferencedLots::default(),
        }
    }

    #[test]
    fn empty_lists_render_a_single_placeholder_line() {
        let sections = build_sections(&empty_doc(), &RenderConfig::default());
        for kind in [SectionKind::OtherTests, SectionKind::Remarks, SectionKind::HeatTests] {
            let lines = section(&sections, kind).expect("section").block.list_lines();
            assert_eq!(lines, ["-".to_string()], "{kind:?}");
        }
    }

    #[test]
    fn regions_follow_the_two_column_plan() {
        let sections = build_sections(&empty_doc(), &RenderConfig::default());
        let left: Vec<_> = sections
            .iter()
            .filter(|s| s.region == Region::Left)
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            left,
            vec![
                SectionKind::ChemicalComposition,
                SectionKind::PhysicalProperties,
                SectionKind::OtherTests,
                SectionKind::Remarks,
            ]
        );
        let right: Vec<_> = sections
            .iter()
            .filter(|s| s.region == Region::Right)
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            right,
            vec![SectionKind::LabDetails, SectionKind::ImpactTests, SectionKind::HeatTests]
        );
    }

    #[test]
    fn item_rows_use_position_when_sequence_missing() {
        let row = item_row(
            2,
            &ItemLine {
                product: Some("Flange".to_string()),
                quantity: Some(12.0),
                ..ItemLine::default()
            },
        );
        assert_eq!(row[0], "3");
        assert_eq!(row[1], "Flange");
        assert_eq!(row[2], "-");
        assert_eq!(row[6], "12");
    }

    #[test]
    fn footer_without_company_leaves_company_line_blank() {
        let sections = build_sections(&empty_doc(), &RenderConfig::default());
        let Block::Text { lines } = &section(&sections, SectionKind::Footer)
            .expect("footer")
            .block
        else {
            panic!("footer must be text");
        };
        assert_eq!(lines[0].right, "");
        assert_eq!(lines[2].right, "Authorized Signatory");
    }
}
