use super::BatchShape;
use super::layout::{
    ColumnMajorLayout, checked_value_count, decode_f64_prefix, expand_batch_index,
    kept_batch_extents,
};
use crate::common::constants::SPECTRUM_CHANNELS;
use crate::domain::LweResult;
use ndarray::{ArrayD, Dimension, IxDyn};
use tracing::debug;

/// Spectral energy density per polarization and in total, batch-major:
/// `([Nsims2,][Nsims,] Nfreq)` with singleton batch axes dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSpectra {
    pub x: ArrayD<f64>,
    pub y: ArrayD<f64>,
    pub total: ArrayD<f64>,
}

pub fn spectrum_value_count(nfreq: usize, batch: BatchShape) -> LweResult<usize> {
    checked_value_count(&[nfreq, SPECTRUM_CHANNELS], batch.nsims, batch.nsims2, "spectrum")
}

/// Decode a spectrum blob laid out as `(Nfreq, 3, Nsims, Nsims2)` in
/// column-major order; channel 0 is x, 1 is y, 2 is the total.
pub fn decode_spectrum(
    bytes: &[u8],
    nfreq: usize,
    batch: BatchShape,
    resource: &str,
) -> LweResult<DecodedSpectra> {
    let values = decode_f64_prefix(bytes, spectrum_value_count(nfreq, batch)?, resource)?;
    let source = ColumnMajorLayout::new(&[nfreq, SPECTRUM_CHANNELS, batch.nsims, batch.nsims2]);

    let mut channel_shape = vec![nfreq];
    channel_shape.extend(kept_batch_extents(batch.nsims, batch.nsims2));
    channel_shape.reverse();
    debug!(resource, channel_shape = ?channel_shape, "decoding spectrum blob");

    Ok(DecodedSpectra {
        x: gather_channel(&values, &source, &channel_shape, batch, 0),
        y: gather_channel(&values, &source, &channel_shape, batch, 1),
        total: gather_channel(&values, &source, &channel_shape, batch, 2),
    })
}

fn gather_channel(
    values: &[f64],
    source: &ColumnMajorLayout,
    channel_shape: &[usize],
    batch: BatchShape,
    channel: usize,
) -> ArrayD<f64> {
    let rank = channel_shape.len();

    ArrayD::from_shape_fn(IxDyn(channel_shape), |index: IxDyn| {
        let position = index.slice();
        let frequency = position[rank - 1];
        let mut collapsed = [0_usize; 2];
        for (slot, axis) in (0..rank - 1).rev().enumerate() {
            collapsed[slot] = position[axis];
        }
        let [sim, sim2] = expand_batch_index(&collapsed[..rank - 1], batch.nsims, batch.nsims2);
        values[source.offset(&[frequency, channel, sim, sim2])]
    })
}
