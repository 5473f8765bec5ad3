use criterion::{black_box, criterion_group, criterion_main, Criterion};
use millcert_ingest::{aggregate, chemical_columns};
use millcert_model::{decode_records, RawParameterRecord};

const ELEMENTS: [&str; 12] = [
    "C", "Mn", "Si", "P", "S", "Cr", "Ni", "Mo", "Cu", "V", "Nb", "Ti",
];

fn synthetic_rows(lots: usize) -> Vec<RawParameterRecord> {
    let mut rows = Vec::with_capacity(lots * (ELEMENTS.len() + 3));
    for lot in 0..lots {
        let lot_id = format!("H{lot:05}");
        for (idx, element) in ELEMENTS.iter().enumerate() {
            rows.push(RawParameterRecord {
                lot_id: lot_id.clone(),
                parm_type: Some("ChemicalComposition".to_string()),
                parm_name: Some((*element).to_string()),
                value_numeric: Some(0.01 * (idx + 1) as f64),
                ..RawParameterRecord::default()
            });
        }
        for temperature in [-20.0, -40.0, -40.0] {
            rows.push(RawParameterRecord {
                lot_id: lot_id.clone(),
                parm_type: Some("ImpactTest".to_string()),
                impact_temperature: Some(temperature),
                impact_size: Some("10x10".to_string()),
                impact_value1: Some("48".to_string()),
                ..RawParameterRecord::default()
            });
        }
    }
    rows
}

fn bench_aggregate(c: &mut Criterion) {
    let records = decode_records(synthetic_rows(2_000));
    c.bench_function("aggregate_2000_lots", |b| {
        b.iter(|| {
            let lots = aggregate(black_box(&records));
            black_box(chemical_columns(lots.values()));
        });
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
