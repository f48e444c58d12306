use crate::common::schema::{Parameter, ParameterSet};
use crate::modules::grid::GridDimensions;
use crate::numerics::fftfreq;

/// Sampling axes implied by the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingAxes {
    pub time_vector: Vec<f64>,
    pub frequency_vector: Vec<f64>,
    /// First `Nfreq` entries of `frequency_vector` with the Nyquist bin
    /// made positive.
    pub frequency_vector_spectrum: Vec<f64>,
    spatial_step: f64,
    nspace: usize,
}

impl SamplingAxes {
    pub fn derive(parameters: &ParameterSet, grid: &GridDimensions) -> Self {
        let time_step = parameters.get(Parameter::TimeStep);
        let spatial_step = parameters.get(Parameter::SpatialStep);

        let time_vector = (0..grid.ntime)
            .map(|index| time_step * index as f64)
            .collect();
        let frequency_vector = fftfreq(grid.ntime, time_step);

        let mut frequency_vector_spectrum: Vec<f64> =
            frequency_vector.iter().take(grid.nfreq).copied().collect();
        if let Some(last) = frequency_vector_spectrum.last_mut() {
            *last = -*last;
        }

        Self {
            time_vector,
            frequency_vector,
            frequency_vector_spectrum,
            spatial_step,
            nspace: grid.nspace,
        }
    }

    /// Transverse sample positions, offset a quarter step from centre.
    ///
    /// Built on demand: a spectra-only load never reads a blob that bounds
    /// `Nspace`.
    pub fn space_vector(&self) -> Vec<f64> {
        let center = self.nspace as f64 / 2.0;
        (0..self.nspace)
            .map(|index| self.spatial_step * (index as f64 - center) + 0.25 * self.spatial_step)
            .collect()
    }
}
