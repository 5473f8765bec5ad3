// SPDX-License-Identifier: Apache-2.0

use crate::{ParameterQuery, ParameterStore, StoreError};
use async_trait::async_trait;
use millcert_model::ParameterRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// In-process store for tests and for callers that already hold the rows.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<ParameterRecord>>,
    /// When set, every fetch fails with this message.
    pub outage: Mutex<Option<String>>,
    pub fetch_calls: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new(records: Vec<ParameterRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn unavailable(message: &str) -> Self {
        Self {
            outage: Mutex::new(Some(message.to_string())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ParameterStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn fetch_records(
        &self,
        query: &ParameterQuery,
    ) -> Result<Vec<ParameterRecord>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.outage.lock().await.clone() {
            return Err(StoreError(message));
        }
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| query.matches(&record.lot_id))
            .cloned()
            .collect())
    }
}
