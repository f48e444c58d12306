mod commands;
mod helpers;

use clap::Parser;
use lwe_core::domain::LweError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let lwe_error = error.as_lwe_error();
            eprintln!("{}", lwe_error.diagnostic_line());
            if let Some(summary_line) = lwe_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            lwe_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("lwe-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.log_level.as_deref());
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "lwe-rs",
    version,
    about = "Load, inspect, and fuse simulation results"
)]
struct Cli {
    /// Log filter directive, e.g. `info` or `lwe_core=debug`; overrides RUST_LOG
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Load a result (`.txt` manifest or `.zip` archive) and print a summary
    Inspect(commands::InspectArgs),
    /// Concatenate sharded `_Ext.dat` and `_spectrum.dat` files next to a manifest
    FuseBinaries(commands::FuseArgs),
    /// Concatenate the blobs of sharded archives into the destination archive
    FuseZips(commands::FuseArgs),
    /// Load single-point shards `<base>0000.txt`… and stack them into one batch
    LoadSplit(commands::LoadSplitArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Inspect(args) => commands::run_inspect_command(args),
        CliCommand::FuseBinaries(args) => commands::run_fuse_binaries_command(args),
        CliCommand::FuseZips(args) => commands::run_fuse_zips_command(args),
        CliCommand::LoadSplit(args) => commands::run_load_split_command(args),
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(log_level: Option<&str>) {
    let filter = log_level
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A second initialisation in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(LweError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<LweError> for CliError {
    fn from(error: LweError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_lwe_error(&self) -> LweError {
        match self {
            Self::Usage(message) => LweError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => LweError::io("IO.CLI", format!("{error:#}")),
        }
    }
}
