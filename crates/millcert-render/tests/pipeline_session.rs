// SPDX-License-Identifier: Apache-2.0

use millcert_model::{
    decode_records, CertificateHeader, CertificateInput, ItemLine, RawParameterRecord,
};
use millcert_render::{generate_certificate, RenderConfig, RenderError};
use millcert_store::{MemoryStore, RecordSession, RetryPolicy};
use std::sync::Arc;
use tempfile::tempdir;

fn input(document_number: Option<&str>) -> CertificateInput {
    CertificateInput {
        header: CertificateHeader {
            document_number: document_number.map(ToString::to_string),
            ..CertificateHeader::default()
        },
        items: vec![ItemLine {
            heat_no: Some("H1".to_string()),
            ..ItemLine::default()
        }],
        ..CertificateInput::default()
    }
}

#[tokio::test]
async fn certificate_is_written_into_output_directory() {
    let store = Arc::new(MemoryStore::new(decode_records(vec![RawParameterRecord {
        lot_id: "H1".to_string(),
        parm_type: Some("ChemicalComposition".to_string()),
        parm_name: Some("C".to_string()),
        value_text: Some("0.21".to_string()),
        ..RawParameterRecord::default()
    }])));
    let mut session = RecordSession::new(store.clone());
    let config = RenderConfig::default();
    let rendered = generate_certificate(&mut session, input(Some("MTC 12/A")), &config)
        .await
        .expect("render");
    assert_eq!(rendered.file_name, "MTC_MTC_12_A.pdf");
    assert!(rendered.warnings.is_empty());

    let out = tempdir().expect("tempdir");
    let path = rendered.write_into(&out.path().join("certs")).expect("write");
    assert_eq!(std::fs::read(&path).expect("read back"), rendered.bytes);

    let mut sink = Vec::new();
    rendered.write_to(&mut sink).expect("sink");
    assert_eq!(sink, rendered.bytes);

    generate_certificate(&mut session, input(Some("MTC-13")), &config)
        .await
        .expect("second render");
    assert_eq!(store.fetch_count(), 1, "session reuses its fetched records");
}

#[tokio::test]
async fn upstream_outage_renders_partial_certificate_with_warning() {
    let store = Arc::new(MemoryStore::unavailable("503 from parameter service"));
    let mut session = RecordSession::new(store).with_retry(RetryPolicy::no_retry());
    let config = RenderConfig::default();
    let rendered = generate_certificate(&mut session, input(Some("DOC-1")), &config)
        .await
        .expect("outage is not fatal");
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(rendered.warnings.len(), 1);
    assert!(rendered.warnings[0].message.contains("503"));
}

#[tokio::test]
async fn missing_document_number_fails_before_fetching() {
    let store = Arc::new(MemoryStore::default());
    let mut session = RecordSession::new(store.clone());
    let err = generate_certificate(&mut session, input(Some("  ")), &RenderConfig::default())
        .await
        .expect_err("blank document number");
    assert!(matches!(err, RenderError::MissingDocumentNumber));
    assert_eq!(store.fetch_count(), 0);
}
