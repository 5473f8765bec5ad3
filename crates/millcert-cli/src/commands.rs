use crate::helpers::{block_on, emit_ok, read_json};
use crate::{CliError, ColumnKind, OutputMode};
use millcert_core::{resolve_config_path, ConfigPathScope};
use millcert_ingest::{aggregate, aggregate_lot, chemical_columns, physical_columns};
use millcert_model::{CertificateInput, LotAggregate, LotId, ParameterRecord};
use millcert_render::{
    generate_certificate, resolve_render_config, ConfigError, RenderConfig, RenderError,
    CONFIG_SCHEMA_VERSION,
};
use millcert_store::{JsonFileStore, ParameterQuery, ParameterStore, RecordSession, SqliteStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub(crate) struct RenderArgs {
    pub(crate) certificate: PathBuf,
    pub(crate) records: Option<PathBuf>,
    pub(crate) sqlite: Option<PathBuf>,
    pub(crate) out_dir: PathBuf,
}

fn config_error(err: &ConfigError) -> CliError {
    CliError::usage("render config could not be loaded").with_detail("error", &err.0)
}

fn load_config(flag: Option<&Path>) -> Result<RenderConfig, CliError> {
    resolve_render_config(flag)
        .map(|(config, _)| config)
        .map_err(|e| config_error(&e))
}

fn render_error(err: RenderError) -> CliError {
    let message = err.to_string();
    match err {
        RenderError::MissingDocumentNumber => CliError::validation(&message),
        RenderError::Config(inner) => config_error(&inner),
        RenderError::Io(msg) => CliError::dependency(msg),
        RenderError::Pdf(msg) => CliError::internal(msg),
    }
}

pub(crate) fn run_render(
    args: RenderArgs,
    config_flag: Option<&Path>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let config = load_config(config_flag)?;
    let input: CertificateInput = read_json(&args.certificate)?;
    let store: Arc<dyn ParameterStore> = match (args.records, args.sqlite) {
        (Some(path), _) => Arc::new(JsonFileStore::new(path)),
        (None, Some(path)) => Arc::new(SqliteStore::new(path)),
        (None, None) => return Err(CliError::usage("one of --records or --sqlite is required")),
    };
    info!(backend = store.backend_tag(), "rendering certificate");
    let mut session = RecordSession::new(store);
    let rendered = block_on(generate_certificate(&mut session, input, &config))?
        .map_err(render_error)?;
    let path = rendered.write_into(&args.out_dir).map_err(render_error)?;
    emit_ok(
        output_mode,
        json!({
            "command": "render",
            "status": "ok",
            "file_name": rendered.file_name,
            "path": path,
            "sha256": rendered.sha256,
            "page_count": rendered.page_count,
            "warnings": rendered
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        }),
    )
    .map_err(CliError::internal)
}

fn fetch_from_file(
    records: &Path,
    query: &ParameterQuery,
) -> Result<Vec<ParameterRecord>, CliError> {
    let store = JsonFileStore::new(records.to_path_buf());
    block_on(store.fetch_records(query))?.map_err(|e| {
        CliError::dependency(e.0).with_detail("path", &records.display().to_string())
    })
}

pub(crate) fn run_aggregate(
    records: &Path,
    lot: Option<&str>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let payload = match lot {
        Some(raw) => {
            let lot_id: LotId = raw
                .parse()
                .map_err(|e: millcert_model::ParseError| CliError::usage(&e.to_string()))?;
            let fetched = fetch_from_file(records, &ParameterQuery::for_lots([lot_id.clone()]))?;
            let lot_aggregate = aggregate_lot(&fetched, &lot_id).ok_or_else(|| {
                CliError::validation("no parameter records for lot")
                    .with_detail("lot", lot_id.as_str())
            })?;
            json!({ "command": "aggregate", "lot": lot_aggregate })
        }
        None => {
            let fetched = fetch_from_file(records, &ParameterQuery::all())?;
            json!({ "command": "aggregate", "lots": aggregate(&fetched) })
        }
    };
    emit_ok(output_mode, payload).map_err(CliError::internal)
}

pub(crate) fn run_columns(
    records: &Path,
    kind: ColumnKind,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let fetched = fetch_from_file(records, &ParameterQuery::all())?;
    let lots = aggregate(&fetched);
    let mut arrival: Vec<&LotId> = Vec::new();
    for record in &fetched {
        if !arrival.contains(&&record.lot_id) {
            arrival.push(&record.lot_id);
        }
    }
    let ordered: Vec<&LotAggregate> = arrival.iter().filter_map(|id| lots.get(*id)).collect();
    let (label, columns) = match kind {
        ColumnKind::Chemical => ("chemical", chemical_columns(ordered.iter().copied())),
        ColumnKind::Physical => ("physical", physical_columns(ordered.iter().copied())),
    };
    emit_ok(
        output_mode,
        json!({ "command": "columns", "kind": label, "columns": columns }),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_config(
    config_flag: Option<&Path>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let (config, source) = resolve_render_config(config_flag).map_err(|e| config_error(&e))?;
    emit_ok(
        output_mode,
        json!({
            "command": "config",
            "schema_version": CONFIG_SCHEMA_VERSION,
            "source": source,
            "paths": {
                "env": resolve_config_path(ConfigPathScope::Explicit),
                "workspace": resolve_config_path(ConfigPathScope::Workspace),
                "user": resolve_config_path(ConfigPathScope::User),
            },
            "config": config,
        }),
    )
    .map_err(CliError::internal)
}
