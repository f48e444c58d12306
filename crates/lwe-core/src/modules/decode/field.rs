use super::BatchShape;
use super::layout::{
    ColumnMajorLayout, checked_value_count, decode_f64_prefix, expand_batch_index,
    kept_batch_extents,
};
use crate::common::constants::FIELD_CHANNELS;
use crate::domain::{GridLayout, LweResult};
use ndarray::{ArrayD, Dimension, IxDyn};
use tracing::debug;

/// Time/space field samples split into the two polarization channels.
///
/// Axes are `(Ntime, Nspace[, Nspace2][, Nsims][, Nsims2])`; batch axes of
/// extent one are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarizedField {
    pub x: ArrayD<f64>,
    pub y: ArrayD<f64>,
}

pub fn field_value_count(grid: &GridLayout, batch: BatchShape) -> LweResult<usize> {
    let mut factors = grid.spatial_shape();
    factors.push(FIELD_CHANNELS);
    checked_value_count(&factors, batch.nsims, batch.nsims2, "field")
}

/// Decode a field blob laid out as `(Ntime, Nspace[, Nspace2], 2·Nsims, Nsims2)`
/// in column-major order, with x at even and y at odd positions along the
/// interleaved axis.
pub fn decode_field(
    bytes: &[u8],
    grid: &GridLayout,
    batch: BatchShape,
    resource: &str,
) -> LweResult<PolarizedField> {
    let values = decode_f64_prefix(bytes, field_value_count(grid, batch)?, resource)?;

    let spatial = grid.spatial_shape();
    let mut source_shape = spatial.clone();
    source_shape.push(FIELD_CHANNELS * batch.nsims);
    source_shape.push(batch.nsims2);
    let source = ColumnMajorLayout::new(&source_shape);

    let mut channel_shape = spatial;
    channel_shape.extend(kept_batch_extents(batch.nsims, batch.nsims2));
    debug!(
        resource,
        source_shape = ?source.shape(),
        channel_shape = ?channel_shape,
        "decoding field blob"
    );

    Ok(PolarizedField {
        x: gather_polarization(&values, &source, &channel_shape, grid, batch, 0),
        y: gather_polarization(&values, &source, &channel_shape, grid, batch, 1),
    })
}

fn gather_polarization(
    values: &[f64],
    source: &ColumnMajorLayout,
    channel_shape: &[usize],
    grid: &GridLayout,
    batch: BatchShape,
    channel: usize,
) -> ArrayD<f64> {
    let spatial_rank = grid.spatial_shape().len();
    let mut source_index = vec![0; spatial_rank + 2];

    ArrayD::from_shape_fn(IxDyn(channel_shape), |index: IxDyn| {
        let position = index.slice();
        source_index[..spatial_rank].copy_from_slice(&position[..spatial_rank]);
        let [sim, sim2] = expand_batch_index(&position[spatial_rank..], batch.nsims, batch.nsims2);
        source_index[spatial_rank] = FIELD_CHANNELS * sim + channel;
        source_index[spatial_rank + 1] = sim2;
        values[source.offset(&source_index)]
    })
}
