#![forbid(unsafe_code)]

mod commands;
mod helpers;

use clap::{error::ErrorKind, ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use millcert_core::{ExitCode, MachineError};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

const MILLCERT_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "millcert", version)]
#[command(about = "Mill test certificate aggregation and rendering")]
#[command(help_template = MILLCERT_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  MILLCERT_LOG_LEVEL         Log filter override\n  MILLCERT_CONFIG            Render config file\n  MILLCERT_DEFAULT_COMPANY   Footer company fallback\n  MILLCERT_ARTIFACT_PREFIX   Output file name prefix"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Render config TOML; overrides MILLCERT_CONFIG and the workspace file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one certificate to PDF.
    #[command(group(ArgGroup::new("source").required(true).args(["records", "sqlite"])))]
    Render {
        #[arg(long)]
        certificate: PathBuf,
        /// JSON array of upstream parameter rows.
        #[arg(long)]
        records: Option<PathBuf>,
        /// SQLite database holding the `test_parameters` table.
        #[arg(long)]
        sqlite: Option<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print per-lot aggregates as JSON.
    Aggregate {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        lot: Option<String>,
    },
    /// Print the column set for a parameter kind.
    Columns {
        #[arg(long)]
        records: PathBuf,
        #[arg(long, value_enum)]
        kind: ColumnKind,
    },
    /// Print the effective render configuration.
    Config,
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ColumnKind {
    Chemical,
    Physical,
}

#[derive(Clone, Copy)]
pub(crate) struct LogFlags {
    pub(crate) quiet: bool,
    pub(crate) verbose: u8,
    pub(crate) json: bool,
}

#[derive(Clone, Copy)]
pub(crate) struct OutputMode {
    pub(crate) json: bool,
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError::usage("invalid command line arguments")
                    .with_detail("error", &err.to_string()));
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    helpers::init_logging(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        json: cli.json,
    });

    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    let config_flag = cli.config.as_deref();

    match command {
        Commands::Render {
            certificate,
            records,
            sqlite,
            out_dir,
        } => commands::run_render(
            commands::RenderArgs {
                certificate,
                records,
                sqlite,
                out_dir,
            },
            config_flag,
            output_mode,
        ),
        Commands::Aggregate { records, lot } => {
            commands::run_aggregate(&records, lot.as_deref(), output_mode)
        }
        Commands::Columns { records, kind } => {
            commands::run_columns(&records, kind, output_mode)
        }
        Commands::Config => commands::run_config(config_flag, output_mode),
        Commands::Version => helpers::emit_ok(
            output_mode,
            serde_json::json!({
                "name": "millcert",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )
        .map_err(CliError::internal),
    }
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub(crate) exit_code: ExitCode,
    pub(crate) machine: MachineError,
}

impl CliError {
    pub(crate) fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    pub(crate) fn validation(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new("validation_error", message),
        }
    }

    pub(crate) fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }

    pub(crate) fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    #[must_use]
    pub(crate) fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.machine = self.machine.with_detail(key, value);
        self
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
        for (key, value) in &error.machine.details {
            eprintln!("  {key}: {value}");
        }
    }
}
