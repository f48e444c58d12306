//! Decoders for the raw field and spectrum blobs.
//!
//! Both blobs are headerless little-endian doubles in column-major order.
//! Their shape is known only from the manifest, so every decoder takes the
//! derived grid and the batch multiplicities explicitly and works on plain
//! byte slices, whatever container they were read from.

mod field;
mod layout;
mod spectrum;

pub use field::{PolarizedField, decode_field, field_value_count};
pub use layout::{ColumnMajorLayout, decode_f64_prefix};
pub use spectrum::{DecodedSpectra, decode_spectrum, spectrum_value_count};

use crate::common::schema::ParameterSet;
use crate::domain::{LweError, LweResult};

/// Batch multiplicities of the primary and secondary scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchShape {
    pub nsims: usize,
    pub nsims2: usize,
}

impl BatchShape {
    pub const fn new(nsims: usize, nsims2: usize) -> Self {
        Self { nsims, nsims2 }
    }

    pub const fn single() -> Self {
        Self::new(1, 1)
    }

    /// Number of simulated points, or `None` when it does not fit in `usize`.
    pub const fn points(&self) -> Option<usize> {
        self.nsims.checked_mul(self.nsims2)
    }

    pub const fn is_single(&self) -> bool {
        self.nsims == 1 && self.nsims2 == 1
    }

    pub fn from_parameters(parameters: &ParameterSet) -> LweResult<Self> {
        let nsims = positive_multiplicity("Nsims", parameters.nsims())?;
        let nsims2 = positive_multiplicity("Nsims2", parameters.nsims2())?;
        Ok(Self::new(nsims, nsims2))
    }
}

fn positive_multiplicity(name: &str, value: i64) -> LweResult<usize> {
    usize::try_from(value)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| LweError::invalid_grid(format!("{name} must be at least 1, got {value}")))
}
