// SPDX-License-Identifier: Apache-2.0

use crate::retry::RetryPolicy;
use crate::{FetchWarning, ParameterQuery, ParameterStore};
use millcert_ingest::{aggregate, aggregate_lot};
use millcert_model::{LotAggregate, LotId, LotLookup, ParameterRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Caller-owned cache of the parameter record set for one
/// document-generation session.
///
/// The first access fetches every record once; later accesses reuse the
/// cached set. There is no invalidation: call [`RecordSession::clear`] or
/// build a new session to observe upstream changes.
pub struct RecordSession {
    store: Arc<dyn ParameterStore>,
    retry: RetryPolicy,
    cached: Option<Vec<ParameterRecord>>,
    warnings: Vec<FetchWarning>,
}

impl RecordSession {
    #[must_use]
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            cached: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Drops the cached records and any warnings from the previous fetch.
    pub fn clear(&mut self) {
        self.cached = None;
        self.warnings.clear();
    }

    #[must_use]
    pub fn warnings(&self) -> &[FetchWarning] {
        &self.warnings
    }

    /// The full record set. A failed fetch yields an empty set plus a warning.
    pub async fn records(&mut self) -> &[ParameterRecord] {
        if self.cached.is_none() {
            let fetched = self.fetch_all().await;
            self.cached = Some(fetched);
        }
        self.cached.as_deref().unwrap_or_default()
    }

    /// Aggregates over the cached record set.
    pub async fn lot_lookup(&mut self) -> SessionLots {
        SessionLots {
            lots: aggregate(self.records().await),
        }
    }

    /// Single-lot aggregate served from the cache.
    pub async fn lot(&mut self, lot_id: &LotId) -> Option<LotAggregate> {
        aggregate_lot(self.records().await, lot_id)
    }

    async fn fetch_all(&mut self) -> Vec<ParameterRecord> {
        let backend = self.store.backend_tag();
        let attempts = self.retry.attempts();
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.store.fetch_records(&ParameterQuery::all()).await {
                Ok(records) => {
                    info!(backend, records = records.len(), attempt, "parameter records fetched");
                    return records;
                }
                Err(err) => {
                    warn!(backend, attempt, error = %err, "parameter record fetch failed");
                    last_error = err.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    }
                }
            }
        }
        self.warnings.push(FetchWarning {
            backend: backend.to_string(),
            message: last_error,
        });
        Vec::new()
    }
}

/// Lot aggregates computed once from a session's record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLots {
    lots: BTreeMap<LotId, LotAggregate>,
}

impl SessionLots {
    #[must_use]
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

impl LotLookup for SessionLots {
    fn lot(&self, lot_id: &LotId) -> Option<LotAggregate> {
        self.lots.get(lot_id).cloned()
    }
}
