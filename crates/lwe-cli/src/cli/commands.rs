use super::CliError;
use super::helpers::*;
use lwe_core::modules::fusion::{fuse_binaries, fuse_zips, load_split};
use lwe_core::modules::serialization::ResultSummary;
use lwe_core::{LoadOptions, load};
use std::path::PathBuf;
use tracing::debug;

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// Manifest (`<base>.txt`) or archive (`<base>.zip`) path
    #[arg(value_name = "PATH")]
    path: PathBuf,

    #[command(flatten)]
    output: ResultOutputFlags,
}

#[derive(clap::Args)]
pub(super) struct FuseArgs {
    /// Destination manifest (`fuse-binaries`) or archive (`fuse-zips`) path
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Fusion config JSON path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the fusion report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct LoadSplitArgs {
    /// Shard path prefix; shards are `<base>0000.txt`, `<base>0001.txt`, …
    #[arg(value_name = "BASE")]
    base: String,

    /// Number of shards
    #[arg(value_name = "COUNT")]
    count: usize,

    /// Manifest parameter that varies across shards, e.g. `frequency1`
    #[arg(value_name = "PARAMETER")]
    parameter: String,

    #[command(flatten)]
    output: ResultOutputFlags,
}

#[derive(clap::Args, Default)]
pub(super) struct ResultOutputFlags {
    /// Skip decoding the field arrays
    #[arg(long)]
    no_field: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl ResultOutputFlags {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            load_field_array: !self.no_field,
        }
    }
}

pub(super) fn run_inspect_command(args: InspectArgs) -> Result<i32, CliError> {
    debug!(path = %args.path.display(), "inspecting result");
    let result = load(&args.path, &args.output.load_options())?;
    emit_summary(&ResultSummary::from_result(&result), args.output.json)?;
    Ok(0)
}

pub(super) fn run_fuse_binaries_command(args: FuseArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let report = fuse_binaries(&args.path, &config)?;
    emit_fusion_report(&report, args.json)?;
    Ok(0)
}

pub(super) fn run_fuse_zips_command(args: FuseArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let report = fuse_zips(&args.path, &config)?;
    emit_fusion_report(&report, args.json)?;
    Ok(0)
}

pub(super) fn run_load_split_command(args: LoadSplitArgs) -> Result<i32, CliError> {
    let result = load_split(
        &args.base,
        args.count,
        &args.parameter,
        &args.output.load_options(),
    )?;
    emit_summary(&ResultSummary::from_result(&result), args.output.json)?;
    Ok(0)
}
