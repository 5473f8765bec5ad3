#![forbid(unsafe_code)]

use async_trait::async_trait;
use millcert_model::{LotId, ParameterRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

mod json_file;
mod memory;
mod retry;
mod session;
mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use retry::RetryPolicy;
pub use session::{RecordSession, SessionLots};
pub use sqlite::{initialize_schema, insert_raw_records, SqliteStore, PARAMETER_TABLE};

pub const CRATE_NAME: &str = "millcert-store";

#[derive(Debug)]
pub struct StoreError(pub String);

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Query-by-criteria over the parameter store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterQuery {
    /// `None` selects every lot.
    pub lot_ids: Option<BTreeSet<LotId>>,
}

impl ParameterQuery {
    #[must_use]
    pub fn all() -> Self {
        Self { lot_ids: None }
    }

    #[must_use]
    pub fn for_lots<I: IntoIterator<Item = LotId>>(lots: I) -> Self {
        Self {
            lot_ids: Some(lots.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn matches(&self, lot_id: &LotId) -> bool {
        self.lot_ids
            .as_ref()
            .map_or(true, |wanted| wanted.contains(lot_id))
    }
}

/// Read-only source of flat parameter records.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn fetch_records(&self, query: &ParameterQuery)
        -> Result<Vec<ParameterRecord>, StoreError>;
}

/// Recoverable fetch failure surfaced to the caller alongside the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchWarning {
    pub backend: String,
    pub message: String,
}

impl Display for FetchWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parameter store `{}` unavailable, rendering without lab data: {}",
            self.backend, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_all_matches_everything() {
        let lot = LotId::parse("H1").expect("lot");
        assert!(ParameterQuery::all().matches(&lot));
        let other = LotId::parse("H2").expect("lot");
        let filtered = ParameterQuery::for_lots([lot.clone()]);
        assert!(filtered.matches(&lot));
        assert!(!filtered.matches(&other));
    }
}
