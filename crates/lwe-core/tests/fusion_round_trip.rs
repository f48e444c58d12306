use lwe_core::common::config::{EntryCompression, FusionConfig};
use lwe_core::common::schema::{Parameter, ParameterSet};
use lwe_core::domain::{DataKind, LweErrorKind};
use lwe_core::modules::fusion::{fuse_binaries, fuse_zips};
use lwe_core::modules::manifest::render_manifest;
use lwe_core::modules::serialization::encode_f64_le;
use lwe_core::{LoadOptions, SimulationResult, load};
use ndarray::{ArrayD, Axis};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const SHARDS: usize = 3;
const NTIME: usize = 16;
const NSPACE: usize = 8;
const NSPACE2: usize = 8;
const NFREQ: usize = NTIME / 2 + 1;

#[test]
fn fused_binaries_decode_like_stacked_shards() {
    let temp = TempDir::new().expect("tempdir should be created");
    for ordinal in 0..SHARDS {
        write_flat_shard(temp.path(), ordinal);
    }
    write_file(
        &temp.path().join("Result.txt"),
        &render_manifest(&volumetric_parameters(SHARDS)),
    );

    let config = FusionConfig {
        chunk_bytes: 1000,
        ..FusionConfig::default()
    };
    let report = fuse_binaries(&temp.path().join("Result.txt"), &config)
        .expect("flat shards should fuse");
    assert_eq!(report.outputs.len(), 2);

    let fused = load(&temp.path().join("Result.txt"), &LoadOptions::default())
        .expect("fused result should load");
    let ext_x = fused.ext_x.as_ref().expect("field should be decoded");
    let ext_y = fused.ext_y.as_ref().expect("field should be decoded");
    assert_eq!(ext_x.shape(), &[NTIME, NSPACE, NSPACE2, SHARDS]);
    assert_eq!(fused.spectrum_total.shape(), &[SHARDS, NFREQ]);
    let batch_vector = fused.batch_vector();
    assert_eq!(batch_vector.len(), SHARDS);
    assert_eq!(batch_vector[0], 5.0);
    assert!((batch_vector[1] - 2.5).abs() < 1e-12);
    assert_eq!(batch_vector[2], 10.0 * 1e-15);

    for ordinal in 0..SHARDS {
        let shard = load(
            &temp.path().join(format!("Result{ordinal:04}.txt")),
            &LoadOptions::default(),
        )
        .expect("shard should load");
        assert_eq!(
            &ext_x.index_axis(Axis(3), ordinal).to_owned(),
            shard_field(&shard, true)
        );
        assert_eq!(
            &ext_y.index_axis(Axis(3), ordinal).to_owned(),
            shard_field(&shard, false)
        );
        assert_eq!(
            fused.spectrum_x.index_axis(Axis(0), ordinal).to_owned(),
            shard.spectrum_x
        );
        assert_eq!(
            fused.spectrum_y.index_axis(Axis(0), ordinal).to_owned(),
            shard.spectrum_y
        );
        assert_eq!(
            fused.spectrum_total.index_axis(Axis(0), ordinal).to_owned(),
            shard.spectrum_total
        );
    }
}

#[test]
fn fused_zips_match_fused_binaries() {
    let flat = TempDir::new().expect("tempdir should be created");
    let archived = TempDir::new().expect("tempdir should be created");
    for ordinal in 0..SHARDS {
        write_flat_shard(flat.path(), ordinal);
        write_archive_shard(archived.path(), ordinal);
    }
    write_zip(
        &archived.path().join("Result.zip"),
        &[(
            "Result.txt".to_string(),
            render_manifest(&volumetric_parameters(SHARDS)).into_bytes(),
        )],
    );

    fuse_binaries(&flat.path().join("Result.txt"), &FusionConfig::default())
        .expect("flat shards should fuse");
    let stored = FusionConfig {
        compression: EntryCompression::Stored,
        ..FusionConfig::default()
    };
    let report = fuse_zips(&archived.path().join("Result.zip"), &stored)
        .expect("archive shards should fuse");
    assert_eq!(
        report
            .output(DataKind::Field)
            .and_then(|output| output.entry.as_deref()),
        Some("Result_Ext.dat")
    );

    let archive_path = archived.path().join("Result.zip");
    for kind in DataKind::ALL {
        let flat_bytes =
            fs::read(flat.path().join(kind.entry_name("Result"))).expect("flat output exists");
        assert_eq!(read_entry(&archive_path, &kind.entry_name("Result")), flat_bytes);
    }

    let from_archive =
        load(&archive_path, &LoadOptions::default()).expect("fused archive should load");
    let flat_manifest = flat.path().join("Result.txt");
    write_file(
        &flat_manifest,
        &render_manifest(&volumetric_parameters(SHARDS)),
    );
    let from_flat = load(&flat_manifest, &LoadOptions::default()).expect("flat result loads");
    assert_eq!(from_archive.ext_x, from_flat.ext_x);
    assert_eq!(from_archive.spectrum_total, from_flat.spectrum_total);
}

#[test]
fn failed_binary_fusion_leaves_no_partial_pair() {
    let temp = TempDir::new().expect("tempdir should be created");
    for ordinal in 0..SHARDS {
        write_flat_shard(temp.path(), ordinal);
    }
    let manifest = temp.path().join("Result.txt");
    write_file(&manifest, &render_manifest(&volumetric_parameters(SHARDS)));
    fs::write(
        temp.path().join("Result0002_spectrum.dat"),
        encode_f64_le(&[0.0; 2]),
    )
    .expect("short spectrum shard written");

    let error = fuse_binaries(&manifest, &FusionConfig::default())
        .expect_err("last spectrum shard is short");
    assert_eq!(error.kind(), LweErrorKind::TruncatedBinaryData);
    for kind in DataKind::ALL {
        assert!(!temp.path().join(kind.entry_name("Result")).exists());
    }

    let error = load(&manifest, &LoadOptions::default()).expect_err("nothing was published");
    assert_eq!(error.kind(), LweErrorKind::MissingResource);
}

#[test]
fn failed_zip_fusion_keeps_destination_archive_intact() {
    let temp = TempDir::new().expect("tempdir should be created");
    for ordinal in 0..SHARDS {
        write_archive_shard(temp.path(), ordinal);
    }
    let (_, spectrum) = shard_blobs(2);
    write_zip(
        &temp.path().join("Result0002.zip"),
        &[
            (
                "Result0002.txt".to_string(),
                render_manifest(&volumetric_parameters(1)).into_bytes(),
            ),
            ("Result0002_Ext.dat".to_string(), encode_f64_le(&[0.0; 4])),
            ("Result0002_spectrum.dat".to_string(), spectrum),
        ],
    );
    let destination = temp.path().join("Result.zip");
    write_zip(
        &destination,
        &[(
            "Result.txt".to_string(),
            render_manifest(&volumetric_parameters(SHARDS)).into_bytes(),
        )],
    );
    let before = fs::read(&destination).expect("destination should exist");

    let error = fuse_zips(&destination, &FusionConfig::default())
        .expect_err("last field entry is short");
    assert_eq!(error.kind(), LweErrorKind::TruncatedBinaryData);
    assert_eq!(fs::read(&destination).expect("destination still exists"), before);
    assert_eq!(
        fs::read_dir(temp.path()).expect("directory lists").count(),
        SHARDS + 1,
        "no staging files are left behind"
    );
}

#[test]
fn shape_mismatch_leaves_destinations_untouched() {
    let flat = TempDir::new().expect("tempdir should be created");
    let archived = TempDir::new().expect("tempdir should be created");
    for ordinal in 0..SHARDS {
        write_flat_shard(flat.path(), ordinal);
        write_archive_shard(archived.path(), ordinal);
    }
    let mut wider = volumetric_parameters(1);
    wider.set(Parameter::SpatialWidth, 2.0 * NSPACE as f64);
    write_file(&flat.path().join("Result0001.txt"), &render_manifest(&wider));
    let (field, spectrum) = shard_blobs(1);
    write_zip(
        &archived.path().join("Result0001.zip"),
        &[
            ("Result0001.txt".to_string(), render_manifest(&wider).into_bytes()),
            ("Result0001_Ext.dat".to_string(), field),
            ("Result0001_spectrum.dat".to_string(), spectrum),
        ],
    );

    let error = fuse_binaries(&flat.path().join("Result.txt"), &FusionConfig::default())
        .expect_err("flat grids differ");
    assert_eq!(error.kind(), LweErrorKind::ShardShapeMismatch);
    for kind in DataKind::ALL {
        assert!(!flat.path().join(kind.entry_name("Result")).exists());
    }

    let error = fuse_zips(&archived.path().join("Result.zip"), &FusionConfig::default())
        .expect_err("archived grids differ");
    assert_eq!(error.kind(), LweErrorKind::ShardShapeMismatch);
    assert!(!archived.path().join("Result.zip").exists());
}

fn shard_field(shard: &SimulationResult, x_channel: bool) -> &ArrayD<f64> {
    let field = if x_channel { &shard.ext_x } else { &shard.ext_y };
    field.as_ref().expect("shard field should be decoded")
}

fn volumetric_parameters(nsims: usize) -> ParameterSet {
    let mut parameters = ParameterSet::default();
    parameters.set(Parameter::TimeSpan, NTIME as f64);
    parameters.set(Parameter::TimeStep, 1.0);
    parameters.set(Parameter::SpatialWidth, NSPACE as f64);
    parameters.set(Parameter::SpatialHeight, NSPACE2 as f64);
    parameters.set(Parameter::SpatialStep, 1.0);
    parameters.set(Parameter::SymmetryType, 2.0);
    parameters.set(Parameter::Delay1, 5.0);
    parameters.set(Parameter::BatchIndex, 9.0);
    parameters.set(Parameter::BatchDestination, 10.0);
    parameters.set(Parameter::Nsims, nsims as f64);
    parameters.set(Parameter::Nsims2, 1.0);
    parameters
}

fn shard_blobs(ordinal: usize) -> (Vec<u8>, Vec<u8>) {
    let offset = 1.0e4 * ordinal as f64;
    let field: Vec<f64> = (0..2 * NTIME * NSPACE * NSPACE2)
        .map(|index| offset + 0.5 * index as f64)
        .collect();
    let spectrum: Vec<f64> = (0..3 * NFREQ)
        .map(|index| offset - 0.25 * index as f64)
        .collect();
    (encode_f64_le(&field), encode_f64_le(&spectrum))
}

fn write_flat_shard(dir: &Path, ordinal: usize) {
    let stem = format!("Result{ordinal:04}");
    let (field, spectrum) = shard_blobs(ordinal);
    write_file(
        &dir.join(format!("{stem}.txt")),
        &render_manifest(&volumetric_parameters(1)),
    );
    fs::write(dir.join(format!("{stem}_Ext.dat")), field).expect("field shard written");
    fs::write(dir.join(format!("{stem}_spectrum.dat")), spectrum)
        .expect("spectrum shard written");
}

fn write_archive_shard(dir: &Path, ordinal: usize) {
    let stem = format!("Result{ordinal:04}");
    let (field, spectrum) = shard_blobs(ordinal);
    write_zip(
        &dir.join(format!("{stem}.zip")),
        &[
            (
                format!("{stem}.txt"),
                render_manifest(&volumetric_parameters(1)).into_bytes(),
            ),
            (format!("{stem}_Ext.dat"), field),
            (format!("{stem}_spectrum.dat"), spectrum),
        ],
    );
}

fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(path).expect("archive should be created"));
    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .expect("entry should start");
        writer.write_all(bytes).expect("entry should be written");
    }
    writer.finish().expect("archive should finish");
}

fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive =
        ZipArchive::new(File::open(path).expect("archive should open")).expect("valid archive");
    let mut bytes = Vec::new();
    archive
        .by_name(name)
        .expect("entry should exist")
        .read_to_end(&mut bytes)
        .expect("entry should be read");
    bytes
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should be written");
}
