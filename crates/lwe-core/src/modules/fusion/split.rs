use crate::common::constants::{MANIFEST_EXTENSION, SHARD_ORDINAL_WIDTH};
use crate::common::schema::Parameter;
use crate::domain::{LweError, LweResult};
use crate::modules::batch::BatchAxis;
use crate::modules::decode::BatchShape;
use crate::modules::result::{LoadOptions, SimulationResult, load};
use ndarray::{ArrayD, ArrayViewD, Axis, stack};
use std::path::PathBuf;
use tracing::info;

/// `<base><ordinal>.txt` with a zero-padded four digit ordinal.
pub fn shard_manifest_path(base: &str, ordinal: usize) -> PathBuf {
    PathBuf::from(format!(
        "{base}{ordinal:0width$}.{MANIFEST_EXTENSION}",
        width = SHARD_ORDINAL_WIDTH
    ))
}

/// Load `count` single-point shards and stack them into one result whose
/// batch vector holds each shard's manifest value of `parameter`, without
/// unit conversion.
pub fn load_split(
    base: &str,
    count: usize,
    parameter: &str,
    options: &LoadOptions,
) -> LweResult<SimulationResult> {
    let mut builder = SplitResultBuilder::new(count, parameter, options)?;
    for ordinal in 0..count {
        let path = shard_manifest_path(base, ordinal);
        let shard = load(&path, options)?;
        builder.push(shard)?;
        info!(shard = %path.display(), ordinal, "stacked split shard");
    }
    builder.finish()
}

/// Collects single-point shards in ordinal order; only [`finish`] produces a
/// result, so a failing shard never leaves a half-filled one behind.
///
/// [`finish`]: SplitResultBuilder::finish
#[derive(Debug)]
pub struct SplitResultBuilder {
    count: usize,
    parameter: Parameter,
    load_field_array: bool,
    first: Option<SimulationResult>,
    ext_x: Vec<ArrayD<f64>>,
    ext_y: Vec<ArrayD<f64>>,
    spectrum_x: Vec<ArrayD<f64>>,
    spectrum_y: Vec<ArrayD<f64>>,
    spectrum_total: Vec<ArrayD<f64>>,
    batch_values: Vec<f64>,
}

impl SplitResultBuilder {
    pub fn new(count: usize, parameter: &str, options: &LoadOptions) -> LweResult<Self> {
        if count == 0 {
            return Err(LweError::invalid_grid("a split run needs at least one shard"));
        }
        let parameter = Parameter::from_name(parameter).ok_or_else(|| {
            LweError::manifest_parse(format!("'{parameter}' is not a manifest parameter"))
        })?;
        Ok(Self {
            count,
            parameter,
            load_field_array: options.load_field_array,
            first: None,
            ext_x: Vec::with_capacity(count),
            ext_y: Vec::with_capacity(count),
            spectrum_x: Vec::with_capacity(count),
            spectrum_y: Vec::with_capacity(count),
            spectrum_total: Vec::with_capacity(count),
            batch_values: Vec::with_capacity(count),
        })
    }

    pub fn len(&self) -> usize {
        self.batch_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_values.is_empty()
    }

    /// Add the shard with the next ordinal.
    pub fn push(&mut self, mut shard: SimulationResult) -> LweResult<()> {
        let ordinal = self.len();
        if ordinal == self.count {
            return Err(LweError::shard_mismatch(format!(
                "all {} shards were already added",
                self.count
            )));
        }
        if !shard.batch.is_single() {
            return Err(LweError::shard_mismatch(format!(
                "shard {ordinal} holds {}x{} batch points, expected a single point",
                shard.batch.nsims, shard.batch.nsims2
            )));
        }
        if let Some(first) = &self.first {
            if !first.grid.same_shape(&shard.grid) {
                return Err(LweError::shard_mismatch(format!(
                    "shard {ordinal} has grid {}x{}x{} but shard 0 has {}x{}x{}",
                    shard.grid.ntime,
                    shard.grid.nspace,
                    shard.grid.nspace2,
                    first.grid.ntime,
                    first.grid.nspace,
                    first.grid.nspace2
                )));
            }
        }

        if self.load_field_array {
            match (shard.ext_x.take(), shard.ext_y.take()) {
                (Some(ext_x), Some(ext_y)) => {
                    self.ext_x.push(ext_x);
                    self.ext_y.push(ext_y);
                }
                _ => {
                    return Err(LweError::internal(
                        "RUN.SPLIT_FIELD",
                        format!("shard {ordinal} was loaded without its field arrays"),
                    ));
                }
            }
        }
        self.batch_values.push(shard.manifest_value(self.parameter));
        self.spectrum_x
            .push(std::mem::replace(&mut shard.spectrum_x, empty_array()));
        self.spectrum_y
            .push(std::mem::replace(&mut shard.spectrum_y, empty_array()));
        self.spectrum_total
            .push(std::mem::replace(&mut shard.spectrum_total, empty_array()));
        if self.first.is_none() {
            self.first = Some(shard);
        }
        Ok(())
    }

    pub fn finish(self) -> LweResult<SimulationResult> {
        let Some(first) = self.first else {
            return Err(LweError::invalid_grid("a split run needs at least one shard"));
        };
        if self.batch_values.len() != self.count {
            return Err(LweError::shard_mismatch(format!(
                "{} of {} shards were added",
                self.batch_values.len(),
                self.count
            )));
        }

        let (ext_x, ext_y) = if self.load_field_array {
            (
                Some(stack_along(&self.ext_x, StackAxis::Trailing)?),
                Some(stack_along(&self.ext_y, StackAxis::Trailing)?),
            )
        } else {
            (None, None)
        };

        let mut parameters = first.parameters;
        parameters.set(Parameter::Nsims, self.count as f64);
        parameters.set(Parameter::Nsims2, 1.0);
        let batch_axis = BatchAxis {
            batch_index: first.batch_axis.batch_index,
            start: self.batch_values[0],
            destination: self.batch_values[self.batch_values.len() - 1],
            manifest_destination: self.batch_values[self.batch_values.len() - 1],
            values: self.batch_values,
        };

        Ok(SimulationResult {
            parameters,
            grid: first.grid,
            batch: BatchShape::new(self.count, 1),
            source_kind: first.source_kind,
            ext_x,
            ext_y,
            spectrum_x: stack_along(&self.spectrum_x, StackAxis::Leading)?,
            spectrum_y: stack_along(&self.spectrum_y, StackAxis::Leading)?,
            spectrum_total: stack_along(&self.spectrum_total, StackAxis::Leading)?,
            batch_axis,
            batch_axis2: first.batch_axis2,
            axes: first.axes,
        })
    }
}

#[derive(Clone, Copy)]
enum StackAxis {
    Leading,
    Trailing,
}

fn empty_array() -> ArrayD<f64> {
    ArrayD::zeros(vec![0])
}

fn stack_along(arrays: &[ArrayD<f64>], position: StackAxis) -> LweResult<ArrayD<f64>> {
    let axis = match position {
        StackAxis::Leading => 0,
        StackAxis::Trailing => arrays.first().map_or(0, |array| array.ndim()),
    };
    let views: Vec<ArrayViewD<'_, f64>> = arrays.iter().map(|array| array.view()).collect();
    stack(Axis(axis), &views).map_err(|source| {
        LweError::internal(
            "RUN.SPLIT_STACK",
            format!("failed to stack shard arrays: {source}"),
        )
    })
}
