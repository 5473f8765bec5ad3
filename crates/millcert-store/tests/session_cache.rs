// SPDX-License-Identifier: Apache-2.0

use millcert_model::{decode_records, LotId, LotLookup, RawParameterRecord};
use millcert_store::{MemoryStore, RecordSession, RetryPolicy};
use std::sync::Arc;

fn row(lot_id: &str, element: &str, value: &str) -> RawParameterRecord {
    RawParameterRecord {
        lot_id: lot_id.to_string(),
        parm_type: Some("ChemicalComposition".to_string()),
        parm_name: Some(element.to_string()),
        value_text: Some(value.to_string()),
        ..RawParameterRecord::default()
    }
}

fn lot(id: &str) -> LotId {
    LotId::parse(id).expect("lot id")
}

#[tokio::test]
async fn session_fetches_once_and_reuses_the_cache() {
    let store = Arc::new(MemoryStore::new(decode_records(vec![
        row("H1", "C", "0.21"),
        row("H2", "C", "0.30"),
    ])));
    let mut session = RecordSession::new(store.clone());
    assert!(!session.is_loaded());

    assert_eq!(session.records().await.len(), 2);
    let lots = session.lot_lookup().await;
    assert!(lots.lot(&lot("H1")).is_some());
    assert!(session.lot(&lot("H2")).await.is_some());
    assert_eq!(store.fetch_count(), 1);
    assert!(session.warnings().is_empty());
}

#[tokio::test]
async fn cache_is_not_refreshed_until_cleared() {
    let store = Arc::new(MemoryStore::new(decode_records(vec![row("H1", "C", "0.21")])));
    let mut session = RecordSession::new(store.clone());
    assert_eq!(session.records().await.len(), 1);

    store
        .records
        .lock()
        .await
        .extend(decode_records(vec![row("H2", "C", "0.30")]));
    assert_eq!(session.records().await.len(), 1);

    session.clear();
    assert_eq!(session.records().await.len(), 2);
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn outage_yields_empty_records_and_a_warning() {
    let store = Arc::new(MemoryStore::unavailable("connection refused"));
    let mut session = RecordSession::new(store.clone()).with_retry(RetryPolicy {
        max_attempts: 3,
        base_backoff_ms: 1,
    });

    assert!(session.records().await.is_empty());
    assert!(session.lot_lookup().await.is_empty());
    assert_eq!(store.fetch_count(), 3);
    let warnings = session.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].backend, "memory");
    assert!(warnings[0].message.contains("connection refused"));

    session.records().await;
    assert_eq!(store.fetch_count(), 3, "failed fetch is cached for the session");
}
