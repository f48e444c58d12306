use super::shards::{Shard, ShardGridCheck, discover_shards};
use super::{
    FusedOutput, FusionReport, ShardGeometry, copy_in_chunks, destination_directory, write_error,
};
use crate::common::config::{EntryCompression, FusionConfig};
use crate::common::constants::{ARCHIVE_EXTENSION, MANIFEST_EXTENSION};
use crate::domain::{DataKind, LweError, LweResult};
use crate::modules::result::{archive_entry_error, file_stem};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Entry order inside the destination archive.
const ENTRY_ORDER: [DataKind; 2] = [DataKind::Spectrum, DataKind::Field];

/// Fuse the blobs of every sibling `<base>*.zip` into `<base>.zip` as
/// `<base>_spectrum.dat` and `<base>_Ext.dat`, keeping any other entries the
/// destination already holds.
pub fn fuse_zips(archive_path: &Path, config: &FusionConfig) -> LweResult<FusionReport> {
    let directory = destination_directory(archive_path);
    let base = file_stem(archive_path)?;
    let destination_name = format!("{base}.{ARCHIVE_EXTENSION}");
    let destination = directory.join(&destination_name);
    let suffix = format!(".{ARCHIVE_EXTENSION}");

    let existing = destination.is_file();
    if existing {
        ensure_targets_absent(&destination, &base)?;
    }

    let shards = discover_shards(&directory, &base, &suffix, &destination_name)?;
    info!(
        destination = %destination.display(),
        shards = shards.len(),
        "fusing archive shards"
    );

    let mut spectrum = Accumulator::new(DataKind::Spectrum)?;
    let mut field = Accumulator::new(DataKind::Field)?;
    let mut grids = ShardGridCheck::default();
    for shard in &shards {
        let mut archive = open_archive(&shard.path)?;
        if config.validate_shard_grids {
            validate_archive_shard(&mut archive, shard, &mut grids)?;
        }
        spectrum.append(&mut archive, shard, config.chunk_bytes)?;
        field.append(&mut archive, shard, config.chunk_bytes)?;
        info!(shard = %shard.name, "appended archive shard");
    }

    let mut staged =
        NamedTempFile::new_in(&directory).map_err(|source| write_error(&destination, source))?;
    if existing {
        let mut previous = File::open(&destination).map_err(|source| write_error(&destination, source))?;
        std::io::copy(&mut previous, staged.as_file_mut())
            .map_err(|source| write_error(&destination, source))?;
    }

    let mut outputs = Vec::with_capacity(ENTRY_ORDER.len());
    {
        let mut writer = if existing {
            ZipWriter::new_append(staged.as_file_mut())
                .map_err(|source| write_error(&destination, source))?
        } else {
            ZipWriter::new(staged.as_file_mut())
        };
        let options = SimpleFileOptions::default()
            .compression_method(compression_method(config.compression))
            .large_file(true);

        for kind in ENTRY_ORDER {
            let accumulator = match kind {
                DataKind::Spectrum => &mut spectrum,
                DataKind::Field => &mut field,
            };
            let entry = kind.entry_name(&base);
            writer
                .start_file(entry.as_str(), options)
                .map_err(|source| write_error(&destination, source))?;
            let bytes = accumulator.drain_into(&mut writer, config.chunk_bytes)?;
            outputs.push(FusedOutput {
                kind,
                destination: destination.clone(),
                entry: Some(entry),
                shards: shards.iter().map(|shard| shard.name.clone()).collect(),
                bytes,
            });
        }
        writer
            .finish()
            .map_err(|source| write_error(&destination, source))?;
    }

    staged
        .persist(&destination)
        .map_err(|source| write_error(&destination, source.error))?;
    Ok(FusionReport { outputs })
}

/// Anonymous temporary file collecting one blob kind across shards.
struct Accumulator {
    kind: DataKind,
    file: File,
    bytes: u64,
}

impl Accumulator {
    fn new(kind: DataKind) -> LweResult<Self> {
        let file = tempfile::tempfile().map_err(|source| {
            LweError::io(
                "IO.FUSE_WRITE",
                format!("failed to create {kind} accumulation file: {source}"),
            )
        })?;
        Ok(Self {
            kind,
            file,
            bytes: 0,
        })
    }

    fn append(
        &mut self,
        archive: &mut ZipArchive<File>,
        shard: &Shard,
        chunk_bytes: usize,
    ) -> LweResult<()> {
        let name = self.kind.entry_name(&shard.stem);
        let label = format!("{}:{}", shard.name, name);
        let mut entry = archive
            .by_name(&name)
            .map_err(|source| archive_entry_error(&label, source))?;
        self.bytes += copy_in_chunks(&mut entry, &mut self.file, chunk_bytes, &label)?;
        Ok(())
    }

    fn drain_into(&mut self, writer: &mut impl Write, chunk_bytes: usize) -> LweResult<u64> {
        let label = format!("{} accumulation file", self.kind);
        self.file.seek(SeekFrom::Start(0)).map_err(|source| {
            LweError::io("IO.FUSE_READ", format!("failed to rewind {label}: {source}"))
        })?;
        let copied = copy_in_chunks(&mut self.file, writer, chunk_bytes, &label)?;
        if copied != self.bytes {
            return Err(LweError::internal(
                "RUN.FUSE_ACCUMULATION",
                format!("{label} held {copied} bytes, expected {}", self.bytes),
            ));
        }
        Ok(copied)
    }
}

fn compression_method(compression: EntryCompression) -> CompressionMethod {
    match compression {
        EntryCompression::Stored => CompressionMethod::Stored,
        EntryCompression::Deflated => CompressionMethod::Deflated,
    }
}

fn open_archive(path: &Path) -> LweResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|source| {
        LweError::io(
            "IO.FUSE_READ",
            format!("failed to open archive '{}': {}", path.display(), source),
        )
    })?;
    ZipArchive::new(file).map_err(|source| {
        LweError::io(
            "IO.ARCHIVE_OPEN",
            format!("failed to open archive '{}': {}", path.display(), source),
        )
    })
}

fn ensure_targets_absent(destination: &Path, base: &str) -> LweResult<()> {
    let archive = open_archive(destination)?;
    for kind in ENTRY_ORDER {
        let entry = kind.entry_name(base);
        if archive.file_names().any(|name| name == entry) {
            return Err(LweError::input_validation(
                "INPUT.FUSE_DESTINATION_ENTRY",
                format!(
                    "'{}' already contains '{}'",
                    destination.display(),
                    entry
                ),
            ));
        }
    }
    Ok(())
}

fn validate_archive_shard(
    archive: &mut ZipArchive<File>,
    shard: &Shard,
    grids: &mut ShardGridCheck,
) -> LweResult<()> {
    let manifest_name = format!("{}.{}", shard.stem, MANIFEST_EXTENSION);
    let label = format!("{}:{}", shard.name, manifest_name);
    let mut manifest = String::new();
    archive
        .by_name(&manifest_name)
        .map_err(|source| archive_entry_error(&label, source))?
        .read_to_string(&mut manifest)
        .map_err(|source| {
            LweError::io("IO.FUSE_READ", format!("failed to read '{label}': {source}"))
        })?;

    let geometry = ShardGeometry::from_manifest(&manifest)?;
    grids.check(&shard.name, geometry.grid)?;
    for kind in ENTRY_ORDER {
        let name = kind.entry_name(&shard.stem);
        let label = format!("{}:{}", shard.name, name);
        let size = archive
            .by_name(&name)
            .map_err(|source| archive_entry_error(&label, source))?
            .size();
        geometry.ensure_length(kind, &label, size)?;
    }
    Ok(())
}
