//! Reassembling cluster-split runs.
//!
//! `fuse_binaries` and `fuse_zips` concatenate shard blobs byte for byte in
//! shard-name order, before any decoding. `load_split` works after decoding
//! and stacks single-point results into one batched result.

mod binaries;
mod shards;
mod split;
mod zips;

pub use binaries::fuse_binaries;
pub use shards::{Shard, ShardGridCheck, discover_shards};
pub use split::{SplitResultBuilder, load_split, shard_manifest_path};
pub use zips::fuse_zips;

use crate::common::constants::F64_BYTES;
use crate::domain::{DataKind, LweError, LweResult};
use crate::modules::decode::{BatchShape, field_value_count, spectrum_value_count};
use crate::modules::grid::{GridDimensions, derive_grid_from_parameters};
use crate::modules::manifest::parse_manifest;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// One fused output and the shards it was built from, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusedOutput {
    pub kind: DataKind,
    pub destination: PathBuf,
    /// Entry name inside the destination archive, for archive fusion.
    pub entry: Option<String>,
    pub shards: Vec<String>,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionReport {
    pub outputs: Vec<FusedOutput>,
}

impl FusionReport {
    pub fn total_bytes(&self) -> u64 {
        self.outputs.iter().map(|output| output.bytes).sum()
    }

    pub fn output(&self, kind: DataKind) -> Option<&FusedOutput> {
        self.outputs.iter().find(|output| output.kind == kind)
    }
}

/// Grid and multiplicities a shard manifest declares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShardGeometry {
    pub grid: GridDimensions,
    pub batch: BatchShape,
}

impl ShardGeometry {
    pub fn from_manifest(source: &str) -> LweResult<Self> {
        let parameters = parse_manifest(source)?;
        Ok(Self {
            grid: derive_grid_from_parameters(&parameters)?,
            batch: BatchShape::from_parameters(&parameters)?,
        })
    }

    pub fn required_values(&self, kind: DataKind) -> LweResult<usize> {
        match kind {
            DataKind::Field => field_value_count(&self.grid.layout(), self.batch),
            DataKind::Spectrum => spectrum_value_count(self.grid.nfreq, self.batch),
        }
    }

    pub fn ensure_length(&self, kind: DataKind, shard: &str, available: u64) -> LweResult<()> {
        let required = self.required_values(kind)?;
        let available = usize::try_from(available / F64_BYTES as u64).unwrap_or(usize::MAX);
        if available < required {
            return Err(LweError::truncated(shard, required, available));
        }
        Ok(())
    }
}

/// Directory a fusion destination lives in; a bare file name means the
/// working directory.
pub(crate) fn destination_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Copy `reader` into `writer` through a buffer of `chunk_bytes`.
pub(crate) fn copy_in_chunks(
    reader: &mut impl Read,
    writer: &mut impl Write,
    chunk_bytes: usize,
    label: &str,
) -> LweResult<u64> {
    let mut buffer = vec![0_u8; chunk_bytes.max(1)];
    let mut copied = 0_u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(source) if source.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(LweError::io(
                    "IO.FUSE_READ",
                    format!("failed to read shard '{label}': {source}"),
                ));
            }
        };
        writer.write_all(&buffer[..read]).map_err(|source| {
            LweError::io(
                "IO.FUSE_WRITE",
                format!("failed to append shard '{label}': {source}"),
            )
        })?;
        copied += read as u64;
    }
    Ok(copied)
}

pub(crate) fn write_error(target: &Path, source: impl std::fmt::Display) -> LweError {
    LweError::io(
        "IO.FUSE_WRITE",
        format!("failed to write '{}': {}", target.display(), source),
    )
}

#[cfg(test)]
mod tests {
    use super::{ShardGeometry, copy_in_chunks, destination_directory};
    use crate::common::schema::{Parameter, ParameterSet};
    use crate::domain::{DataKind, LweErrorKind};
    use crate::modules::manifest::render_manifest;
    use std::path::{Path, PathBuf};

    #[test]
    fn chunked_copy_preserves_bytes() {
        let source: Vec<u8> = (0..=255).collect();
        let mut reader = source.as_slice();
        let mut sink = Vec::new();
        let copied = copy_in_chunks(&mut reader, &mut sink, 7, "inline").expect("copy succeeds");
        assert_eq!(copied, 256);
        assert_eq!(sink, source);
    }

    #[test]
    fn bare_names_resolve_to_working_directory() {
        assert_eq!(destination_directory(Path::new("Result.txt")), PathBuf::from("."));
        assert_eq!(
            destination_directory(Path::new("runs/Result.txt")),
            PathBuf::from("runs")
        );
    }

    #[test]
    fn geometry_reports_required_blob_lengths() {
        let mut parameters = ParameterSet::default();
        parameters.set(Parameter::TimeSpan, 16.0);
        parameters.set(Parameter::TimeStep, 1.0);
        parameters.set(Parameter::SpatialWidth, 8.0);
        parameters.set(Parameter::SpatialStep, 1.0);
        parameters.set(Parameter::Nsims, 2.0);
        parameters.set(Parameter::Nsims2, 1.0);

        let geometry =
            ShardGeometry::from_manifest(&render_manifest(&parameters)).expect("geometry parses");
        assert_eq!(
            geometry.required_values(DataKind::Field).expect("count should fit"),
            2 * 16 * 8 * 2
        );
        assert_eq!(
            geometry.required_values(DataKind::Spectrum).expect("count should fit"),
            3 * 9 * 2
        );

        let error = geometry
            .ensure_length(DataKind::Spectrum, "short", 8)
            .expect_err("one value is not enough");
        assert_eq!(error.kind(), LweErrorKind::TruncatedBinaryData);
    }
}
