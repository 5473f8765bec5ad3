// SPDX-License-Identifier: Apache-2.0

use crate::{ParameterQuery, ParameterStore, StoreError};
use async_trait::async_trait;
use millcert_model::{decode_records, ParameterRecord, RawParameterRecord};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Reads a JSON array of upstream rows, e.g. an export of the REST endpoint.
pub struct JsonFileStore {
    pub path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Decodes each row on its own; an undecodable row is dropped, not the batch.
fn decode_rows(values: Vec<Value>) -> Vec<RawParameterRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(err) => {
                debug!(row = index, error = %err, "undecodable parameter row dropped");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ParameterStore for JsonFileStore {
    fn backend_tag(&self) -> &'static str {
        "json-file"
    }

    async fn fetch_records(
        &self,
        query: &ParameterQuery,
    ) -> Result<Vec<ParameterRecord>, StoreError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError(format!("read {}: {e}", self.path.display())))?;
        let values: Vec<Value> = serde_json::from_slice(&raw)
            .map_err(|e| StoreError(format!("decode {}: {e}", self.path.display())))?;
        Ok(decode_records(decode_rows(values))
            .into_iter()
            .filter(|record| query.matches(&record.lot_id))
            .collect())
    }
}
