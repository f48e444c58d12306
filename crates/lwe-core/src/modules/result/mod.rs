//! Loading one simulation run into a [`SimulationResult`].

mod axes;
mod source;

pub use axes::SamplingAxes;
pub use source::{ArchiveSource, DirectorySource, ResultSource, is_archive_path};
pub(crate) use source::{archive_entry_error, file_stem, sibling_with_suffix};

use crate::common::constants::F64_BYTES;
use crate::common::schema::{Parameter, ParameterSet};
use crate::domain::{DataKind, LweResult, SourceKind};
use crate::modules::batch::{BatchAxis, BatchSlot, reconstruct_batch_axis};
use crate::modules::decode::{
    BatchShape, decode_field, decode_spectrum, field_value_count, spectrum_value_count,
};
use crate::modules::grid::{GridDimensions, derive_grid_from_parameters};
use crate::modules::manifest::parse_manifest;
use ndarray::ArrayD;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Decode the time/space field blob. Spectra are always decoded.
    pub load_field_array: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            load_field_array: true,
        }
    }
}

impl LoadOptions {
    pub const fn spectra_only() -> Self {
        Self {
            load_field_array: false,
        }
    }
}

/// A fully decoded run. Built once by [`load`] or by the split builder and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Manifest values; `batchDestination`/`batchDestination2` hold the
    /// unit-scaled destinations.
    pub parameters: ParameterSet,
    pub grid: GridDimensions,
    pub batch: BatchShape,
    pub source_kind: SourceKind,
    pub ext_x: Option<ArrayD<f64>>,
    pub ext_y: Option<ArrayD<f64>>,
    pub spectrum_x: ArrayD<f64>,
    pub spectrum_y: ArrayD<f64>,
    pub spectrum_total: ArrayD<f64>,
    pub batch_axis: BatchAxis,
    pub batch_axis2: BatchAxis,
    pub axes: SamplingAxes,
}

impl SimulationResult {
    pub fn batch_vector(&self) -> &[f64] {
        &self.batch_axis.values
    }

    pub fn batch_vector2(&self) -> &[f64] {
        &self.batch_axis2.values
    }

    pub fn batch_start(&self) -> f64 {
        self.batch_axis.start
    }

    pub fn batch_start2(&self) -> f64 {
        self.batch_axis2.start
    }

    pub fn has_field(&self) -> bool {
        self.ext_x.is_some()
    }

    /// Value of `parameter` as the manifest wrote it, before the batch
    /// destinations were converted to SI units.
    pub fn manifest_value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::BatchDestination => self.batch_axis.manifest_destination,
            Parameter::BatchDestination2 => self.batch_axis2.manifest_destination,
            other => self.parameters.get(other),
        }
    }
}

/// Load a run from `<base>.txt` plus sibling blobs, or from `<base>.zip`.
pub fn load(path: &Path, options: &LoadOptions) -> LweResult<SimulationResult> {
    if is_archive_path(path) {
        let mut source = ArchiveSource::open(path)?;
        load_from_source(&mut source, options)
    } else {
        let mut source = DirectorySource::new(path);
        load_from_source(&mut source, options)
    }
}

pub fn load_from_source<S: ResultSource + ?Sized>(
    source: &mut S,
    options: &LoadOptions,
) -> LweResult<SimulationResult> {
    let manifest = source.read_manifest()?;
    let mut parameters = parse_manifest(&manifest)?;

    let grid = derive_grid_from_parameters(&parameters)?;
    let batch = BatchShape::from_parameters(&parameters)?;
    debug!(
        ntime = grid.ntime,
        nspace = grid.nspace,
        nspace2 = grid.nspace2,
        nsims = batch.nsims,
        nsims2 = batch.nsims2,
        "derived run dimensions"
    );

    // Blob lengths bound every allocation sized by the manifest, so both
    // blobs are checked before the batch axes are built.
    let layout = grid.layout();
    let (ext_x, ext_y) = if options.load_field_array {
        let required = field_value_count(&layout, batch)?;
        let bytes = source.read_data(DataKind::Field, required * F64_BYTES)?;
        let field = decode_field(
            &bytes,
            &layout,
            batch,
            &source.describe(Some(DataKind::Field)),
        )?;
        (Some(field.x), Some(field.y))
    } else {
        (None, None)
    };

    let required = spectrum_value_count(grid.nfreq, batch)?;
    let bytes = source.read_data(DataKind::Spectrum, required * F64_BYTES)?;
    let spectra = decode_spectrum(
        &bytes,
        grid.nfreq,
        batch,
        &source.describe(Some(DataKind::Spectrum)),
    )?;

    let batch_axis = reconstruct_batch_axis(&parameters, BatchSlot::Primary, batch.nsims)?;
    let batch_axis2 = reconstruct_batch_axis(&parameters, BatchSlot::Secondary, batch.nsims2)?;
    parameters.set(Parameter::BatchDestination, batch_axis.destination);
    parameters.set(Parameter::BatchDestination2, batch_axis2.destination);

    info!(
        source = %source.describe(None),
        kind = source.kind().as_str(),
        field = ext_x.is_some(),
        "loaded simulation result"
    );

    Ok(SimulationResult {
        axes: SamplingAxes::derive(&parameters, &grid),
        parameters,
        grid,
        batch,
        source_kind: source.kind(),
        ext_x,
        ext_y,
        spectrum_x: spectra.x,
        spectrum_y: spectra.y,
        spectrum_total: spectra.total,
        batch_axis,
        batch_axis2,
    })
}
