use super::shards::{Shard, ShardGridCheck, discover_shards};
use super::{
    FusedOutput, FusionReport, ShardGeometry, copy_in_chunks, destination_directory, write_error,
};
use crate::common::config::FusionConfig;
use crate::common::constants::MANIFEST_EXTENSION;
use crate::domain::{DataKind, LweError, LweResult};
use crate::modules::result::file_stem;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Fuse `<base>*_Ext.dat` and `<base>*_spectrum.dat` next to `manifest_path`
/// into `<base>_Ext.dat` and `<base>_spectrum.dat`.
///
/// Previous outputs are removed first and the new pair is published only
/// after every shard of both kinds has been validated and staged, so a failed
/// run leaves neither output behind.
pub fn fuse_binaries(manifest_path: &Path, config: &FusionConfig) -> LweResult<FusionReport> {
    let directory = destination_directory(manifest_path);
    let base = file_stem(manifest_path)?;

    let destinations = DataKind::ALL.map(|kind| (kind, directory.join(kind.entry_name(&base))));
    for (_, destination) in &destinations {
        remove_existing(destination)?;
    }

    let mut plans = Vec::with_capacity(destinations.len());
    for (kind, destination) in destinations {
        plans.push(plan_kind(&directory, &base, kind, destination, config)?);
    }

    let mut staged = Vec::with_capacity(plans.len());
    for plan in &plans {
        staged.push(stage_kind(&directory, plan, config)?);
    }

    publish(plans, staged)
}

/// Shards of one kind and where their concatenation goes.
struct KindPlan {
    kind: DataKind,
    destination: PathBuf,
    shards: Vec<Shard>,
}

fn plan_kind(
    directory: &Path,
    base: &str,
    kind: DataKind,
    destination: PathBuf,
    config: &FusionConfig,
) -> LweResult<KindPlan> {
    let destination_name = kind.entry_name(base);
    let shards = discover_shards(directory, base, kind.suffix(), &destination_name)?;
    if config.validate_shard_grids {
        validate_shards(directory, &shards, kind)?;
    }
    Ok(KindPlan {
        kind,
        destination,
        shards,
    })
}

/// Concatenate one kind into an unnamed sibling of its destination.
fn stage_kind(
    directory: &Path,
    plan: &KindPlan,
    config: &FusionConfig,
) -> LweResult<(NamedTempFile, u64)> {
    info!(
        destination = %plan.destination.display(),
        shards = plan.shards.len(),
        "fusing {} shards",
        plan.kind
    );

    let mut staged =
        NamedTempFile::new_in(directory).map_err(|source| write_error(&plan.destination, source))?;
    let mut bytes = 0_u64;
    for shard in &plan.shards {
        let mut reader = File::open(&shard.path).map_err(|source| {
            LweError::io(
                "IO.FUSE_READ",
                format!("failed to open shard '{}': {}", shard.path.display(), source),
            )
        })?;
        bytes += copy_in_chunks(&mut reader, &mut staged, config.chunk_bytes, &shard.name)?;
        info!(shard = %shard.name, "appended shard");
    }
    staged
        .flush()
        .map_err(|source| write_error(&plan.destination, source))?;
    Ok((staged, bytes))
}

fn publish(plans: Vec<KindPlan>, staged: Vec<(NamedTempFile, u64)>) -> LweResult<FusionReport> {
    let mut report = FusionReport::default();
    for (plan, (file, bytes)) in plans.into_iter().zip(staged) {
        if let Err(source) = file.persist(&plan.destination) {
            withdraw(&report);
            return Err(write_error(&plan.destination, source.error));
        }
        report.outputs.push(FusedOutput {
            kind: plan.kind,
            destination: plan.destination,
            entry: None,
            shards: plan.shards.into_iter().map(|shard| shard.name).collect(),
            bytes,
        });
    }
    Ok(report)
}

fn withdraw(report: &FusionReport) {
    for output in &report.outputs {
        if let Err(source) = fs::remove_file(&output.destination) {
            warn!(
                destination = %output.destination.display(),
                error = %source,
                "could not withdraw partially published output"
            );
        }
    }
}

fn remove_existing(destination: &Path) -> LweResult<()> {
    match fs::remove_file(destination) {
        Ok(()) => {
            info!(destination = %destination.display(), "removed previous fused output");
            Ok(())
        }
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(write_error(destination, source)),
    }
}

/// Shards with a sibling `<stem>.txt` must agree with the first such shard
/// and be long enough for their own declared shape.
fn validate_shards(directory: &Path, shards: &[Shard], kind: DataKind) -> LweResult<()> {
    let mut grids = ShardGridCheck::default();
    for shard in shards {
        let manifest_path = directory.join(format!("{}.{}", shard.stem, MANIFEST_EXTENSION));
        let manifest = match fs::read_to_string(&manifest_path) {
            Ok(manifest) => manifest,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                warn!(shard = %shard.name, "no shard manifest; fusing without validation");
                continue;
            }
            Err(source) => {
                return Err(LweError::io(
                    "IO.MANIFEST_READ",
                    format!(
                        "failed to read shard manifest '{}': {}",
                        manifest_path.display(),
                        source
                    ),
                ));
            }
        };
        let geometry = ShardGeometry::from_manifest(&manifest)?;
        grids.check(&shard.name, geometry.grid)?;

        let available = fs::metadata(&shard.path)
            .map_err(|source| {
                LweError::io(
                    "IO.FUSE_READ",
                    format!("failed to stat shard '{}': {}", shard.path.display(), source),
                )
            })?
            .len();
        geometry.ensure_length(kind, &shard.name, available)?;
    }
    Ok(())
}
