// SPDX-License-Identifier: Apache-2.0

use crate::{ParameterQuery, ParameterStore, StoreError};
use async_trait::async_trait;
use millcert_core::text::{format_number, parse_lenient_date};
use millcert_model::{decode_records, ParameterRecord, RawParameterRecord};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};

pub const PARAMETER_TABLE: &str = "test_parameters";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS test_parameters (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    lot_id TEXT NOT NULL,
    parm_type TEXT,
    parm_name TEXT,
    value_text TEXT,
    value_numeric REAL,
    impact_temperature REAL,
    impact_size TEXT,
    impact_value1 TEXT,
    impact_value2 TEXT,
    impact_value3 TEXT,
    impact_average TEXT,
    lab_name TEXT,
    lab_report_no TEXT,
    lab_report_date TEXT
);
CREATE INDEX IF NOT EXISTS idx_test_parameters_lot ON test_parameters(lot_id, row_id);
";

const SELECT_COLUMNS: &str = "lot_id, parm_type, parm_name, value_text, value_numeric, \
     impact_temperature, impact_size, impact_value1, impact_value2, impact_value3, \
     impact_average, lab_name, lab_report_no, lab_report_date";

pub fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| StoreError(e.to_string()))
}

/// Appends rows in order; used to seed fixtures.
pub fn insert_raw_records(
    conn: &mut Connection,
    rows: &[RawParameterRecord],
) -> Result<usize, StoreError> {
    let tx = conn.transaction().map_err(|e| StoreError(e.to_string()))?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {PARAMETER_TABLE} ({SELECT_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ))
            .map_err(|e| StoreError(e.to_string()))?;
        for row in rows {
            stmt.execute(params![
                row.lot_id,
                row.parm_type,
                row.parm_name,
                row.value_text,
                row.value_numeric,
                row.impact_temperature,
                row.impact_size,
                row.impact_value1,
                row.impact_value2,
                row.impact_value3,
                row.impact_average,
                row.lab_name,
                row.lab_report_no,
                row.lab_report_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ])
            .map_err(|e| StoreError(e.to_string()))?;
        }
    }
    tx.commit().map_err(|e| StoreError(e.to_string()))?;
    Ok(rows.len())
}

/// SQLite columns are dynamically typed; any storage class is coerced to text.
fn text_column(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get::<_, SqlValue>(index)? {
        SqlValue::Text(text) => Some(text),
        SqlValue::Integer(value) => Some(value.to_string()),
        SqlValue::Real(value) => format_number(value),
        SqlValue::Null | SqlValue::Blob(_) => None,
    })
}

/// Non-numeric text in a REAL column reads as missing.
fn real_column(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get::<_, SqlValue>(index)? {
        SqlValue::Real(value) => Some(value).filter(|v| v.is_finite()),
        SqlValue::Integer(value) => Some(value as f64),
        SqlValue::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        SqlValue::Null | SqlValue::Blob(_) => None,
    })
}

fn raw_from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawParameterRecord> {
    Ok(RawParameterRecord {
        lot_id: text_column(row, 0)?.unwrap_or_default(),
        parm_type: text_column(row, 1)?,
        parm_name: text_column(row, 2)?,
        value_text: text_column(row, 3)?,
        value_numeric: real_column(row, 4)?,
        impact_temperature: real_column(row, 5)?,
        impact_size: text_column(row, 6)?,
        impact_value1: text_column(row, 7)?,
        impact_value2: text_column(row, 8)?,
        impact_value3: text_column(row, 9)?,
        impact_average: text_column(row, 10)?,
        lab_name: text_column(row, 11)?,
        lab_report_no: text_column(row, 12)?,
        lab_report_date: text_column(row, 13)?
            .as_deref()
            .and_then(parse_lenient_date),
    })
}

fn query_rows(
    path: &Path,
    query: &ParameterQuery,
) -> Result<Vec<RawParameterRecord>, StoreError> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| StoreError(format!("open {}: {e}", path.display())))?;
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM {PARAMETER_TABLE}");
    let mut bind: Vec<String> = Vec::new();
    if let Some(lots) = &query.lot_ids {
        if lots.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; lots.len()].join(", ");
        sql.push_str(&format!(" WHERE lot_id IN ({placeholders})"));
        bind.extend(lots.iter().map(|l| l.as_str().to_string()));
    }
    sql.push_str(" ORDER BY row_id");
    let mut stmt = conn.prepare(&sql).map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(bind.iter()), raw_from_sql_row)
        .map_err(|e| StoreError(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(rows)
}

/// Read-only SQLite-backed parameter store.
pub struct SqliteStore {
    pub path: PathBuf,
}

impl SqliteStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ParameterStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_records(
        &self,
        query: &ParameterQuery,
    ) -> Result<Vec<ParameterRecord>, StoreError> {
        let path = self.path.clone();
        let query = query.clone();
        let rows = tokio::task::spawn_blocking(move || query_rows(&path, &query))
            .await
            .map_err(|e| StoreError(format!("sqlite fetch task failed: {e}")))??;
        Ok(decode_records(rows))
    }
}
