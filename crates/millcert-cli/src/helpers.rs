use crate::{CliError, LogFlags, OutputMode};
use millcert_core::{non_blank_env, ENV_MILLCERT_LOG_LEVEL};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `-v`/`-vv`/`--quiet` win over `MILLCERT_LOG_LEVEL`; default is `warn`.
pub(crate) fn init_logging(flags: LogFlags) {
    let flag_level = if flags.quiet {
        Some("error")
    } else {
        match flags.verbose {
            0 => None,
            1 => Some("info"),
            _ => Some("debug"),
        }
    };
    let filter = match (flag_level, non_blank_env(ENV_MILLCERT_LOG_LEVEL)) {
        (Some(level), _) => EnvFilter::new(level),
        (None, Some(spec)) => EnvFilter::try_new(spec).unwrap_or_else(|_| EnvFilter::new("warn")),
        (None, None) => EnvFilter::new("warn"),
    };
    let registry = tracing_subscriber::registry().with(filter);
    let result = if flags.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        eprintln!("logging already initialised; keeping existing subscriber");
    }
}

pub(crate) fn emit_ok(output_mode: OutputMode, payload: Value) -> Result<(), String> {
    if output_mode.json {
        println!(
            "{}",
            serde_json::to_string(&payload).map_err(|e| e.to_string())?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read(path).map_err(|e| {
        CliError::validation("failed to read input file")
            .with_detail("path", &path.display().to_string())
            .with_detail("error", &e.to_string())
    })?;
    serde_json::from_slice(&raw).map_err(|e| {
        CliError::validation("input file is not valid JSON for this command")
            .with_detail("path", &path.display().to_string())
            .with_detail("error", &e.to_string())
    })
}

/// Runs one future on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start async runtime: {e}")))?;
    Ok(runtime.block_on(future))
}
