//! Integer grid sizes derived from the continuous run parameters.

use crate::common::constants::MIN_GRID_DIM;
use crate::common::schema::{Parameter, ParameterSet};
use crate::domain::{GridLayout, LweError, LweResult, is_volumetric_symmetry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInput {
    pub time_span: f64,
    pub time_step: f64,
    pub spatial_width: f64,
    pub spatial_height: f64,
    pub spatial_step: f64,
    pub symmetry_type: i64,
}

impl GridInput {
    pub fn from_parameters(parameters: &ParameterSet) -> Self {
        Self {
            time_span: parameters.get(Parameter::TimeSpan),
            time_step: parameters.get(Parameter::TimeStep),
            spatial_width: parameters.get(Parameter::SpatialWidth),
            spatial_height: parameters.get(Parameter::SpatialHeight),
            spatial_step: parameters.get(Parameter::SpatialStep),
            symmetry_type: parameters.symmetry_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDimensions {
    pub ntime: usize,
    pub nfreq: usize,
    pub f_step: f64,
    pub nspace: usize,
    pub nspace2: usize,
    pub ngrid: usize,
    pub volumetric: bool,
}

impl GridDimensions {
    pub fn layout(&self) -> GridLayout {
        if self.volumetric {
            GridLayout::Volumetric {
                ntime: self.ntime,
                nspace: self.nspace,
                nspace2: self.nspace2,
            }
        } else {
            GridLayout::Planar {
                ntime: self.ntime,
                nspace: self.nspace,
            }
        }
    }

    /// Integer extents agree; the frequency step is a derived quantity and
    /// is not compared.
    pub fn same_shape(&self, other: &GridDimensions) -> bool {
        self.volumetric == other.volumetric
            && self.ntime == other.ntime
            && self.nspace == other.nspace
            && self.nspace2 == other.nspace2
    }
}

pub fn derive_grid(input: &GridInput) -> LweResult<GridDimensions> {
    let ntime = aligned_count("timeSpan", input.time_span, "timeStep", input.time_step)?;
    let nspace = aligned_count(
        "spatialWidth",
        input.spatial_width,
        "spatialStep",
        input.spatial_step,
    )?;
    let volumetric = is_volumetric_symmetry(input.symmetry_type);
    let nspace2 = if volumetric {
        aligned_count(
            "spatialHeight",
            input.spatial_height,
            "spatialStep",
            input.spatial_step,
        )?
    } else {
        1
    };

    let ngrid = ntime
        .checked_mul(nspace)
        .and_then(|count| count.checked_mul(nspace2))
        .ok_or_else(|| {
            LweError::invalid_grid(format!(
                "grid of {ntime} x {nspace} x {nspace2} samples is too large"
            ))
        })?;

    Ok(GridDimensions {
        ntime,
        nfreq: ntime / 2 + 1,
        f_step: 1.0 / (ntime as f64 * input.time_step),
        nspace,
        nspace2,
        ngrid,
        volumetric,
    })
}

pub fn derive_grid_from_parameters(parameters: &ParameterSet) -> LweResult<GridDimensions> {
    derive_grid(&GridInput::from_parameters(parameters))
}

/// `MIN_GRID_DIM · round(span / (MIN_GRID_DIM · step))`, rounding half to even.
fn aligned_count(span_name: &str, span: f64, step_name: &str, step: f64) -> LweResult<usize> {
    if !step.is_finite() || step <= 0.0 {
        return Err(LweError::invalid_grid(format!(
            "{step_name} must be finite and positive, got {step}"
        )));
    }
    if !span.is_finite() || span <= 0.0 {
        return Err(LweError::invalid_grid(format!(
            "{span_name} must be finite and positive, got {span}"
        )));
    }

    let blocks = (span / (MIN_GRID_DIM as f64 * step)).round_ties_even();
    if blocks < 1.0 || blocks > (usize::MAX / MIN_GRID_DIM) as f64 {
        return Err(LweError::invalid_grid(format!(
            "{span_name}/{step_name} = {} does not yield a usable grid",
            span / step
        )));
    }

    Ok(MIN_GRID_DIM * blocks as usize)
}
